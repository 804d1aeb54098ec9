// src/services/round_service.rs

use sqlx::{Acquire, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EvaluationRepository, OrgRepository, RoundRepository},
    models::{
        evaluation::Evaluation,
        round::{next_round_number, EvaluationRound, RoundOverview, RoundStatus, StatusCounts},
    },
};

#[derive(Clone)]
pub struct RoundService {
    round_repo: RoundRepository,
    evaluation_repo: EvaluationRepository,
    org_repo: OrgRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl RoundService {
    pub fn new(
        round_repo: RoundRepository,
        evaluation_repo: EvaluationRepository,
        org_repo: OrgRepository,
        pool: PgPool,
    ) -> Self {
        Self { round_repo, evaluation_repo, org_repo, pool }
    }

    /// Abre uma nova rodada para a empresa, tudo ou nada:
    /// encerra a anterior, numera a nova e inscreve cada colaborador ativo.
    pub async fn open_round(&self, company_id: Uuid) -> Result<EvaluationRound, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a empresa: duas aberturas simultâneas passam uma de cada vez
        self.org_repo
            .lock_active_company(&mut *tx, company_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // 2. Encerra qualquer rodada em andamento
        let closed = self.round_repo.complete_in_progress(&mut *tx, company_id).await?;

        // 3. Próximo número
        let current_max = self.round_repo.max_round_number(&mut *tx, company_id).await?;
        let round_number = next_round_number(current_max);

        // 4. Cria a rodada
        let round = self.round_repo.create_round(&mut *tx, company_id, round_number).await?;

        // 5. Uma avaliação por colaborador ativo, com o gerente atual congelado
        let employees = self.org_repo.list_active_employees(&mut *tx, company_id, None).await?;
        for employee in &employees {
            self.evaluation_repo
                .create_evaluation(&mut *tx, round.id, employee.id, employee.manager_id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            round_number,
            previous_closed = closed,
            enrolled = employees.len(),
            "📋 Rodada aberta"
        );

        Ok(round)
    }

    /// Se houver rodada em andamento, inscreve o colaborador recém-criado nela.
    /// Roda dentro da transação de quem chama.
    pub async fn enroll_employee_in_active_round<'e, A>(
        &self,
        conn: A,
        employee_id: Uuid,
        company_id: Uuid,
        manager_id: Uuid,
    ) -> Result<Option<Evaluation>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let Some(round) = self.round_repo.find_in_progress(&mut *tx, company_id).await? else {
            tx.commit().await?;
            return Ok(None);
        };

        let evaluation = self.evaluation_repo
            .create_evaluation(&mut *tx, round.id, employee_id, manager_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            round_number = round.round_number,
            employee_id = %employee_id,
            "➕ Colaborador inscrito na rodada em andamento"
        );

        Ok(Some(evaluation))
    }

    pub async fn rename_round(&self, round_id: Uuid, name: &str, company_id: Uuid) -> Result<EvaluationRound, AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::RoundNameRequired);
        }

        let mut tx = self.pool.begin().await?;

        let round = self.round_repo.find_by_id(&mut *tx, round_id).await?;
        if round.company_id != company_id {
            return Err(AppError::NotFound);
        }

        if self.round_repo.name_taken(&mut *tx, company_id, round_id, trimmed).await? {
            tracing::debug!(round_id = %round_id, "Nome de rodada repetido rejeitado");
            return Err(AppError::RoundNameTaken);
        }

        let renamed = self.round_repo.rename(&mut *tx, company_id, round_id, trimmed).await?;

        tx.commit().await?;
        Ok(renamed)
    }

    /// Encerra a rodada sem olhar as avaliações; as pendentes continuam pendentes.
    pub async fn close_round(&self, round_id: Uuid, company_id: Uuid) -> Result<EvaluationRound, AppError> {
        let round = self.round_repo.find_by_id(&self.pool, round_id).await?;
        if round.company_id != company_id {
            return Err(AppError::NotFound);
        }

        let closed = self.round_repo.set_status(&self.pool, round_id, RoundStatus::Completed).await?;

        tracing::info!(round_id = %round_id, round_number = closed.round_number, "🔒 Rodada encerrada");
        Ok(closed)
    }

    /// Rodadas da empresa (mais recente primeiro) com as avaliações de cada uma
    pub async fn list_rounds(&self, company_id: Uuid) -> Result<Vec<RoundOverview>, AppError> {
        let rounds = self.round_repo.list_for_company(company_id).await?;

        let mut overviews = Vec::with_capacity(rounds.len());
        for round in rounds {
            overviews.push(self.overview(round).await?);
        }
        Ok(overviews)
    }

    pub async fn get_round(&self, round_id: Uuid, company_id: Uuid) -> Result<RoundOverview, AppError> {
        let round = self.round_repo.find_by_id(&self.pool, round_id).await?;
        if round.company_id != company_id {
            return Err(AppError::NotFound);
        }
        self.overview(round).await
    }

    async fn overview(&self, round: EvaluationRound) -> Result<RoundOverview, AppError> {
        let evaluations = self.evaluation_repo.list_for_round(round.id).await?;
        let counts = StatusCounts::tally(evaluations.iter().map(|e| &e.status));
        Ok(RoundOverview { round, counts, evaluations })
    }
}
