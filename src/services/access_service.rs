// src/services/access_service.rs
//
// Acesso público pelos dois links (gerente e colaborador). Sem login:
// o token é a credencial, e token desconhecido é só "não encontrado".

use sqlx::PgPool;

use crate::{
    common::{error::AppError, token::is_well_formed},
    db::EvaluationRepository,
    models::{
        access::{visible_scores, EmployeeResultsView, ManagerFormView},
        evaluation::{format_score, overall_score, Evaluation, EvaluationStatus, SubmitEvaluationPayload},
        round::RoundStatus,
    },
    services::evaluation_service::EvaluationService,
};

#[derive(Clone)]
pub struct AccessService {
    evaluation_repo: EvaluationRepository,
    evaluation_service: EvaluationService,
    pool: PgPool,
}

impl AccessService {
    pub fn new(evaluation_repo: EvaluationRepository, evaluation_service: EvaluationService, pool: PgPool) -> Self {
        Self { evaluation_repo, evaluation_service, pool }
    }

    async fn resolve_manager_token(&self, token: &str) -> Result<Evaluation, AppError> {
        if !is_well_formed(token) {
            return Err(AppError::NotFound);
        }
        self.evaluation_repo
            .find_by_manager_token(&self.pool, token)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn resolve_employee_token(&self, token: &str) -> Result<Evaluation, AppError> {
        if !is_well_formed(token) {
            return Err(AppError::NotFound);
        }
        self.evaluation_repo
            .find_by_employee_token(&self.pool, token)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Formulário do gerente. Só tira o snapshot quando o formulário está de fato aberto.
    pub async fn manager_form(&self, token: &str) -> Result<ManagerFormView, AppError> {
        let evaluation = self.resolve_manager_token(token).await?;
        let context = self.evaluation_repo.find_context(&self.pool, evaluation.id).await?;

        if evaluation.manager_submitted_at.is_some() {
            return Ok(ManagerFormView::AlreadySubmitted { employee_name: context.employee_name });
        }
        if context.round_status == RoundStatus::Completed {
            return Ok(ManagerFormView::RoundClosed);
        }
        if evaluation.cancelled_at.is_some() {
            return Ok(ManagerFormView::Cancelled);
        }

        let kpis = self.evaluation_service.ensure_snapshot(evaluation.id).await?;

        Ok(ManagerFormView::Open {
            employee_name: context.employee_name,
            employee_role: context.employee_role,
            round_number: context.round_number,
            kpis,
        })
    }

    pub async fn submit_by_token(&self, token: &str, payload: &SubmitEvaluationPayload) -> Result<(), AppError> {
        // Faixa e recomendações antes mesmo de procurar o token
        payload.check()?;

        let evaluation = self.resolve_manager_token(token).await?;
        self.evaluation_service.submit(evaluation.id, payload).await?;
        Ok(())
    }

    /// Resultado do colaborador: nada aparece antes da publicação.
    pub async fn employee_results(&self, token: &str) -> Result<EmployeeResultsView, AppError> {
        let evaluation = self.resolve_employee_token(token).await?;

        if evaluation.status() != EvaluationStatus::Published {
            return Ok(EmployeeResultsView::NotPublished);
        }

        let context = self.evaluation_repo.find_context(&self.pool, evaluation.id).await?;
        let scores = self.evaluation_repo.list_scores(&self.pool, evaluation.id).await?;
        let overall = overall_score(&scores);

        Ok(EmployeeResultsView::Published {
            employee_name: context.employee_name,
            employee_role: context.employee_role,
            round_number: context.round_number,
            overall_score: overall,
            overall_score_display: format_score(overall),
            scores: visible_scores(evaluation.snapshot(), &scores),
            recommendations: evaluation.manager_recommendations.clone(),
        })
    }
}
