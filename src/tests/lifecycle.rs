// src/tests/lifecycle.rs
//
// Rodadas, avaliações e links públicos contra um banco de verdade.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, token::generate_access_token},
    config::AppState,
    db::EvaluationRepository,
    models::{
        access::{EmployeeResultsView, ManagerFormView},
        evaluation::{
            Evaluation, EvaluationStatus, HrAdjustPayload, HrScoreAdjustment, KpiSnapshotEntry, ScoreInput,
            SubmitEvaluationPayload,
        },
        org::Employee,
        round::RoundStatus,
    },
    tests::test_config,
};

struct Fixture {
    state: AppState,
    pool: PgPool,
    company_id: Uuid,
    manager_id: Uuid,
    employees: Vec<Employee>,
}

async fn fixture(pool: PgPool, names: &[&str]) -> Fixture {
    let state = AppState::with_pool(pool.clone(), test_config());
    let company = state.org_service.create_company("Acme").await.unwrap();
    let manager = state.org_service.create_manager(company.id, "Joana").await.unwrap();

    let mut employees = Vec::new();
    for name in names {
        let employee = state
            .org_service
            .create_employee(company.id, manager.id, name, "Developer")
            .await
            .unwrap();
        employees.push(employee);
    }

    Fixture { state, pool, company_id: company.id, manager_id: manager.id, employees }
}

impl Fixture {
    async fn add_kpis(&self, employee_id: Uuid, names: &[&str]) {
        for name in names {
            self.state
                .kpi_service
                .create(self.company_id, employee_id, name, &format!("How is their {name}?"))
                .await
                .unwrap();
        }
    }

    async fn evaluation_for(&self, round_id: Uuid, employee_id: Uuid) -> Evaluation {
        let overview = self.state.round_service.get_round(round_id, self.company_id).await.unwrap();
        let row = overview
            .evaluations
            .iter()
            .find(|row| row.employee_id == employee_id)
            .unwrap();
        EvaluationRepository::new(self.pool.clone())
            .find_by_id(&self.pool, row.evaluation_id)
            .await
            .unwrap()
    }

    async fn open_form(&self, token: &str) -> Vec<KpiSnapshotEntry> {
        match self.state.access_service.manager_form(token).await.unwrap() {
            ManagerFormView::Open { kpis, .. } => kpis,
            other => panic!("expected an open form, got {other:?}"),
        }
    }
}

fn full_marks(kpis: &[KpiSnapshotEntry], rating: i32) -> SubmitEvaluationPayload {
    SubmitEvaluationPayload {
        scores: kpis
            .iter()
            .map(|k| ScoreInput { kpi_id: k.id, rating, comment: Some(format!("{} looks fine", k.name)) })
            .collect(),
        recommendations: "Take ownership of the billing service".to_string(),
    }
}

// =============================================================================
//  RODADAS
// =============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn opening_a_round_enrolls_every_active_employee(pool: PgPool) {
    let fx = fixture(pool, &["Ana", "Bruno", "Carla"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    assert_eq!(round.round_number, 1);
    assert_eq!(round.status, RoundStatus::InProgress);

    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.evaluations.len(), 3);
    assert_eq!(overview.counts.pending, 3);
    assert!(overview.evaluations.iter().all(|e| e.status == EvaluationStatus::Pending));
    assert!(overview.evaluations.iter().all(|e| e.manager_id == fx.manager_id));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn deleted_employees_are_not_enrolled(pool: PgPool) {
    let fx = fixture(pool, &["Ana", "Bruno"]).await;
    fx.state
        .org_service
        .delete_employee(fx.company_id, fx.employees[1].id)
        .await
        .unwrap();

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.evaluations.len(), 1);
    assert_eq!(overview.evaluations[0].employee_id, fx.employees[0].id);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reopening_closes_the_previous_round_and_numbers_without_gaps(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;

    for _ in 0..3 {
        fx.state.round_service.open_round(fx.company_id).await.unwrap();
    }

    let rounds = fx.state.round_service.list_rounds(fx.company_id).await.unwrap();
    let numbers: Vec<i32> = rounds.iter().map(|r| r.round.round_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);

    let open: Vec<_> = rounds.iter().filter(|r| r.round.status == RoundStatus::InProgress).collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].round.round_number, 3);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_opens_never_leave_two_rounds_in_progress(pool: PgPool) {
    let fx = fixture(pool, &["Ana", "Bruno"]).await;
    let rounds = fx.state.round_service.clone();
    let other = fx.state.round_service.clone();

    let (a, b) = tokio::join!(rounds.open_round(fx.company_id), other.open_round(fx.company_id));
    let mut numbers = vec![a.unwrap().round_number, b.unwrap().round_number];
    numbers.sort();
    assert_eq!(numbers, vec![1, 2]);

    let listed = fx.state.round_service.list_rounds(fx.company_id).await.unwrap();
    let in_progress = listed.iter().filter(|r| r.round.status == RoundStatus::InProgress).count();
    assert_eq!(in_progress, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn opening_a_round_for_an_unknown_company_is_not_found(pool: PgPool) {
    let state = AppState::with_pool(pool, test_config());
    let result = state.round_service.open_round(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn round_names_are_unique_per_company(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let first = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let second = fx.state.round_service.open_round(fx.company_id).await.unwrap();

    let renamed = fx
        .state
        .round_service
        .rename_round(first.id, "  Q1 2025 ", fx.company_id)
        .await
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Q1 2025"));

    let clash = fx.state.round_service.rename_round(second.id, "Q1 2025", fx.company_id).await;
    assert!(matches!(clash, Err(AppError::RoundNameTaken)));

    let blank = fx.state.round_service.rename_round(second.id, "   ", fx.company_id).await;
    assert!(matches!(blank, Err(AppError::RoundNameRequired)));

    // Renomear a própria rodada com o mesmo nome não é conflito
    let same = fx.state.round_service.rename_round(first.id, "Q1 2025", fx.company_id).await;
    assert!(same.is_ok());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn employee_created_mid_round_is_enrolled(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();

    let newcomer = fx
        .state
        .org_service
        .create_employee(fx.company_id, fx.manager_id, "Diego", "Designer")
        .await
        .unwrap();

    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.evaluations.len(), 2);
    assert!(overview.evaluations.iter().any(|e| e.employee_id == newcomer.id));

    // Depois de encerrada, ninguém mais entra
    fx.state.round_service.close_round(round.id, fx.company_id).await.unwrap();
    fx.state
        .org_service
        .create_employee(fx.company_id, fx.manager_id, "Eva", "QA")
        .await
        .unwrap();
    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.evaluations.len(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reassigning_a_manager_keeps_enrolled_evaluations(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    let other = fx.state.org_service.create_manager(fx.company_id, "Marcos").await.unwrap();

    let first = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    fx.state
        .org_service
        .update_employee(fx.company_id, employee, "Ana", "Developer", Some(other.id))
        .await
        .unwrap();

    let enrolled = fx.evaluation_for(first.id, employee).await;
    assert_eq!(enrolled.manager_id, fx.manager_id);

    let second = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let next = fx.evaluation_for(second.id, employee).await;
    assert_eq!(next.manager_id, other.id);
}

// =============================================================================
//  KPIs E SNAPSHOT
// =============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_kpi_renumbers_the_rest(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed", "teamwork"]).await;

    let kpis = fx.state.kpi_service.list(fx.company_id, employee).await.unwrap();
    let remaining = fx
        .state
        .kpi_service
        .delete(fx.company_id, employee, kpis[1].id)
        .await
        .unwrap();

    let summary: Vec<(&str, i32)> = remaining.iter().map(|k| (k.name.as_str(), k.order)).collect();
    assert_eq!(summary, vec![("quality", 1), ("teamwork", 2)]);

    fx.add_kpis(employee, &["ownership"]).await;
    let kpis = fx.state.kpi_service.list(fx.company_id, employee).await.unwrap();
    assert_eq!(kpis.last().map(|k| k.order), Some(3));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_kpi_creates_get_distinct_positions(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    let kpis = fx.state.kpi_service.clone();

    let (a, b, c) = tokio::join!(
        kpis.create(fx.company_id, employee, "quality", "How is their quality?"),
        kpis.create(fx.company_id, employee, "speed", "How is their speed?"),
        kpis.create(fx.company_id, employee, "teamwork", "How is their teamwork?"),
    );
    let mut positions = vec![a.unwrap().order, b.unwrap().order, c.unwrap().order];
    positions.sort();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn snapshot_is_frozen_on_first_open(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;
    assert!(!evaluation.manager_opened);

    let first = fx.open_form(&evaluation.manager_form_token).await;
    assert_eq!(first.len(), 2);

    // O RH mexe nos KPIs depois da abertura
    let kpis = fx.state.kpi_service.list(fx.company_id, employee).await.unwrap();
    fx.state
        .kpi_service
        .update(fx.company_id, employee, kpis[0].id, "craft", "Rewritten question")
        .await
        .unwrap();
    fx.add_kpis(employee, &["mentoring"]).await;

    let second = fx.open_form(&evaluation.manager_form_token).await;
    assert_eq!(second, first);
    assert_eq!(second[0].name, "quality");

    let reloaded = fx.evaluation_for(round.id, employee).await;
    assert!(reloaded.manager_opened);

    // A segunda abertura só lê: a linha da avaliação não é regravada
    fx.open_form(&evaluation.manager_form_token).await;
    let untouched = fx.evaluation_for(round.id, employee).await;
    assert_eq!(untouched.updated_at, reloaded.updated_at);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_first_opens_agree_on_one_snapshot(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;

    let (a, b) = tokio::join!(
        fx.state.evaluation_service.ensure_snapshot(evaluation.id),
        fx.state.evaluation_service.ensure_snapshot(evaluation.id),
    );
    assert_eq!(a.unwrap(), b.unwrap());
}

// =============================================================================
//  ENVIO DO GERENTE
// =============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn submission_locks_the_evaluation(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;
    let kpis = fx.open_form(&evaluation.manager_form_token).await;

    fx.state
        .access_service
        .submit_by_token(&evaluation.manager_form_token, &full_marks(&kpis, 4))
        .await
        .unwrap();

    let again = fx
        .state
        .access_service
        .submit_by_token(&evaluation.manager_form_token, &full_marks(&kpis, 1))
        .await;
    assert!(matches!(again, Err(AppError::AlreadySubmitted)));

    let view = fx.state.access_service.manager_form(&evaluation.manager_form_token).await.unwrap();
    assert!(matches!(view, ManagerFormView::AlreadySubmitted { ref employee_name } if employee_name == "Ana"));

    let review = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    assert_eq!(review.status, EvaluationStatus::Submitted);
    assert_eq!(review.scores.len(), 2);
    assert!(review.scores.iter().all(|s| s.score.manager_score == Some(4)));
    assert_eq!(
        review.evaluation.manager_recommendations.as_deref(),
        Some("Take ownership of the billing service")
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn submission_in_a_closed_round_is_rejected(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;
    let kpis = fx.open_form(&evaluation.manager_form_token).await;

    fx.state.round_service.close_round(round.id, fx.company_id).await.unwrap();

    let result = fx
        .state
        .access_service
        .submit_by_token(&evaluation.manager_form_token, &full_marks(&kpis, 3))
        .await;
    assert!(matches!(result, Err(AppError::RoundClosed)));

    let view = fx.state.access_service.manager_form(&evaluation.manager_form_token).await.unwrap();
    assert!(matches!(view, ManagerFormView::RoundClosed));

    // Encerrar não mexe no estado da avaliação
    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.counts.pending, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn submission_must_score_exactly_the_snapshot(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;

    // Formulário nunca aberto: não há snapshot para conferir
    let unopened = fx
        .state
        .evaluation_service
        .submit(evaluation.id, &full_marks(&[], 3))
        .await;
    assert!(matches!(unopened, Err(AppError::FormNotOpened)));

    let kpis = fx.open_form(&evaluation.manager_form_token).await;
    let partial = fx
        .state
        .access_service
        .submit_by_token(&evaluation.manager_form_token, &full_marks(&kpis[..1], 3))
        .await;
    assert!(matches!(partial, Err(AppError::ScoreSetMismatch)));

    // Nada foi gravado pela tentativa rejeitada
    let review = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    assert!(review.scores.is_empty());
    assert_eq!(review.status, EvaluationStatus::Pending);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn unknown_tokens_are_not_found(pool: PgPool) {
    let state = AppState::with_pool(pool, test_config());
    let token = generate_access_token();

    assert!(matches!(state.access_service.manager_form(&token).await, Err(AppError::NotFound)));
    assert!(matches!(state.access_service.employee_results(&token).await, Err(AppError::NotFound)));

    let payload = SubmitEvaluationPayload { scores: vec![], recommendations: "Fine".into() };
    assert!(matches!(
        state.access_service.submit_by_token(&token, &payload).await,
        Err(AppError::NotFound)
    ));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn manager_and_employee_tokens_are_not_interchangeable(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, fx.employees[0].id).await;

    assert_ne!(evaluation.manager_form_token, evaluation.employee_view_token);
    assert!(matches!(
        fx.state.access_service.manager_form(&evaluation.employee_view_token).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        fx.state.access_service.employee_results(&evaluation.manager_form_token).await,
        Err(AppError::NotFound)
    ));
}

// =============================================================================
//  RH: AJUSTES, PUBLICAÇÃO, CANCELAMENTO
// =============================================================================

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn hr_adjustments_are_all_or_nothing(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;
    let kpis = fx.open_form(&evaluation.manager_form_token).await;
    fx.state.evaluation_service.submit(evaluation.id, &full_marks(&kpis, 3)).await.unwrap();

    let review = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    let first_score = review.scores[0].score.id;

    // Um id de nota estranho derruba o lote inteiro
    let bad_batch = HrAdjustPayload {
        scores: vec![
            HrScoreAdjustment {
                score_id: first_score,
                hr_adjusted_score: Some(5),
                hr_comment: Some("Led the migration".into()),
                show_to_employee: true,
            },
            HrScoreAdjustment {
                score_id: Uuid::new_v4(),
                hr_adjusted_score: None,
                hr_comment: None,
                show_to_employee: false,
            },
        ],
    };
    let result = fx.state.evaluation_service.hr_adjust(evaluation.id, &bad_batch).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let after = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    assert!(after.scores.iter().all(|s| s.score.hr_adjusted_score.is_none()));

    // Ajuste sem comentário derruba o lote antes de qualquer escrita
    let second_score = review.scores[1].score.id;
    let no_comment = HrAdjustPayload {
        scores: vec![
            HrScoreAdjustment {
                score_id: second_score,
                hr_adjusted_score: None,
                hr_comment: None,
                show_to_employee: false,
            },
            HrScoreAdjustment {
                score_id: first_score,
                hr_adjusted_score: Some(5),
                hr_comment: Some("   ".into()),
                show_to_employee: true,
            },
        ],
    };
    assert!(matches!(
        fx.state.evaluation_service.hr_adjust(evaluation.id, &no_comment).await,
        Err(AppError::HrCommentRequired)
    ));
    let after = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    assert!(after.scores.iter().all(|s| s.score.show_to_employee));

    let good = HrAdjustPayload { scores: vec![bad_batch.scores[0].clone()] };
    let updated = fx.state.evaluation_service.hr_adjust(evaluation.id, &good).await.unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].hr_adjusted_score, Some(5));
    // A nota do gerente continua lá
    assert_eq!(updated[0].manager_score, Some(3));
    assert_eq!(updated[0].effective_score(), 5);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn employee_sees_results_only_after_publication(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let employee = fx.employees[0].id;
    fx.add_kpis(employee, &["quality", "speed", "teamwork"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, employee).await;
    let kpis = fx.open_form(&evaluation.manager_form_token).await;
    fx.state.evaluation_service.submit(evaluation.id, &full_marks(&kpis, 3)).await.unwrap();

    let view = fx.state.access_service.employee_results(&evaluation.employee_view_token).await.unwrap();
    assert!(matches!(view, EmployeeResultsView::NotPublished));

    // quality: RH sobe para 5; teamwork: escondida do colaborador
    let review = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    let adjustments = review
        .scores
        .iter()
        .map(|s| {
            let name = s.kpi_name.as_deref().unwrap_or_default();
            HrScoreAdjustment {
                score_id: s.score.id,
                hr_adjusted_score: (name == "quality").then_some(5),
                hr_comment: (name == "quality").then(|| "Best reviews on the team".to_string()),
                show_to_employee: name != "teamwork",
            }
        })
        .collect();
    fx.state
        .evaluation_service
        .hr_adjust(evaluation.id, &HrAdjustPayload { scores: adjustments })
        .await
        .unwrap();

    fx.state.evaluation_service.publish(evaluation.id).await.unwrap();
    // Publicar de novo não muda nada
    fx.state.evaluation_service.publish(evaluation.id).await.unwrap();

    match fx.state.access_service.employee_results(&evaluation.employee_view_token).await.unwrap() {
        EmployeeResultsView::Published { employee_name, round_number, overall_score, overall_score_display, scores, recommendations, .. } => {
            assert_eq!(employee_name, "Ana");
            assert_eq!(round_number, 1);
            assert!((overall_score - 4.0).abs() < f64::EPSILON);
            assert_eq!(overall_score_display, "4.0");
            let names: Vec<&str> = scores.iter().map(|s| s.kpi_name.as_str()).collect();
            assert_eq!(names, vec!["quality", "speed"]);
            assert_eq!(scores[0].score, 5);
            assert_eq!(recommendations.as_deref(), Some("Take ownership of the billing service"));
        }
        other => panic!("expected published results, got {other:?}"),
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn cancellation_policy(pool: PgPool) {
    let fx = fixture(pool, &["Ana", "Bruno"]).await;
    fx.add_kpis(fx.employees[0].id, &["quality"]).await;
    fx.add_kpis(fx.employees[1].id, &["quality"]).await;

    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let pending = fx.evaluation_for(round.id, fx.employees[0].id).await;
    let submitted = fx.evaluation_for(round.id, fx.employees[1].id).await;

    // Pendente: cancela, e cancelar de novo mantém o primeiro instante
    let cancelled = fx.state.evaluation_service.cancel(pending.id).await.unwrap();
    let first_at = cancelled.cancelled_at;
    assert!(first_at.is_some());
    let again = fx.state.evaluation_service.cancel(pending.id).await.unwrap();
    assert_eq!(again.cancelled_at, first_at);
    assert_eq!(again.status(), EvaluationStatus::Cancelled);

    let view = fx.state.access_service.manager_form(&pending.manager_form_token).await.unwrap();
    assert!(matches!(view, ManagerFormView::Cancelled));

    let kpis = fx.state.evaluation_service.ensure_snapshot(pending.id).await.unwrap();
    let result = fx.state.evaluation_service.submit(pending.id, &full_marks(&kpis, 4)).await;
    assert!(matches!(result, Err(AppError::EvaluationCancelled)));

    // Cancelada domina publicada: o colaborador não vê nada
    fx.state.evaluation_service.publish(pending.id).await.unwrap();
    let view = fx.state.access_service.employee_results(&pending.employee_view_token).await.unwrap();
    assert!(matches!(view, EmployeeResultsView::NotPublished));

    // Enviada: não pode mais ser cancelada
    let kpis = fx.open_form(&submitted.manager_form_token).await;
    fx.state.evaluation_service.submit(submitted.id, &full_marks(&kpis, 4)).await.unwrap();
    let result = fx.state.evaluation_service.cancel(submitted.id).await;
    assert!(matches!(result, Err(AppError::AlreadySubmitted)));

    let overview = fx.state.round_service.get_round(round.id, fx.company_id).await.unwrap();
    assert_eq!(overview.counts.cancelled, 1);
    assert_eq!(overview.counts.submitted, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn review_builds_shareable_links(pool: PgPool) {
    let fx = fixture(pool, &["Ana"]).await;
    let round = fx.state.round_service.open_round(fx.company_id).await.unwrap();
    let evaluation = fx.evaluation_for(round.id, fx.employees[0].id).await;

    let review = fx.state.evaluation_service.review(evaluation.id, fx.company_id).await.unwrap();
    assert_eq!(
        review.manager_form_link,
        format!("http://hr.test/evaluate/{}", evaluation.manager_form_token)
    );
    assert_eq!(
        review.employee_view_link,
        format!("http://hr.test/scores/{}", evaluation.employee_view_token)
    );
    assert_eq!(review.employee_name, "Ana");
    assert_eq!(review.manager_name, "Joana");

    // Outra empresa não enxerga a avaliação
    let other = fx.state.org_service.create_company("Globex").await.unwrap();
    let result = fx.state.evaluation_service.review(evaluation.id, other.id).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}
