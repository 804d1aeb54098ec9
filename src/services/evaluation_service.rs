// src/services/evaluation_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{EvaluationRepository, KpiRepository, RoundRepository},
    common::error::AppError,
    models::{
        access::{snapshot_lookup, EvaluationReview, ReviewScore},
        evaluation::{Evaluation, EvaluationScore, HrAdjustPayload, KpiSnapshotEntry, SubmitEvaluationPayload},
    },
};

#[derive(Clone)]
pub struct EvaluationService {
    evaluation_repo: EvaluationRepository,
    round_repo: RoundRepository,
    kpi_repo: KpiRepository,
    pool: PgPool,
    public_base_url: String,
}

impl EvaluationService {
    pub fn new(
        evaluation_repo: EvaluationRepository,
        round_repo: RoundRepository,
        kpi_repo: KpiRepository,
        pool: PgPool,
        public_base_url: String,
    ) -> Self {
        Self { evaluation_repo, round_repo, kpi_repo, pool, public_base_url }
    }

    // =========================================================================
    //  SNAPSHOT DOS KPIs
    // =========================================================================

    /// Congela os KPIs atuais do colaborador na primeira abertura do formulário.
    /// Nas aberturas seguintes devolve o mesmo snapshot, sem escrever nada.
    pub async fn ensure_snapshot(&self, evaluation_id: Uuid) -> Result<Vec<KpiSnapshotEntry>, AppError> {
        let evaluation = self.evaluation_repo.find_by_id(&self.pool, evaluation_id).await?;
        if let Some(existing) = evaluation.snapshot() {
            return Ok(existing.to_vec());
        }

        let snapshot: Vec<KpiSnapshotEntry> = self.kpi_repo
            .list_for_employee(&self.pool, evaluation.employee_id)
            .await?
            .into_iter()
            .map(|kpi| KpiSnapshotEntry {
                id: kpi.id,
                name: kpi.name,
                form_question: kpi.form_question,
                order: kpi.order,
            })
            .collect();

        // Escrita condicionada a snapshot_kpis IS NULL
        match self.evaluation_repo
            .write_snapshot_if_absent(&self.pool, evaluation_id, &snapshot)
            .await?
        {
            Some(_) => {
                tracing::info!(evaluation_id = %evaluation_id, kpis = snapshot.len(), "📸 Snapshot de KPIs gravado");
                Ok(snapshot)
            }
            None => {
                // Outra abertura venceu a corrida; vale o que ela gravou
                let winner = self.evaluation_repo.find_by_id(&self.pool, evaluation_id).await?;
                winner
                    .snapshot()
                    .map(<[KpiSnapshotEntry]>::to_vec)
                    .ok_or_else(|| anyhow::anyhow!("snapshot ausente após escrita concorrente").into())
            }
        }
    }

    // =========================================================================
    //  ENVIO DO GERENTE
    // =========================================================================

    /// Grava as notas e trava a avaliação numa única transação.
    pub async fn submit(&self, evaluation_id: Uuid, payload: &SubmitEvaluationPayload) -> Result<Evaluation, AppError> {
        // a. faixa das notas + recomendações
        payload.check()?;

        let mut tx = self.pool.begin().await?;

        // b. existe? (e segura a linha contra um segundo envio simultâneo)
        let evaluation = self.evaluation_repo.lock_by_id(&mut *tx, evaluation_id).await?;
        let round = self.round_repo.find_by_id(&mut *tx, evaluation.round_id).await?;

        // c, d, e. já enviada / rodada encerrada / cancelada
        if let Err(e) = evaluation.ensure_submittable(round.status) {
            tracing::warn!(evaluation_id = %evaluation_id, reason = %e, "Envio rejeitado");
            return Err(e);
        }

        let kpi_ids: Vec<Uuid> = payload.scores.iter().map(|s| s.kpi_id).collect();
        evaluation.ensure_scores_match_snapshot(&kpi_ids)?;

        for score in &payload.scores {
            let comment = score.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
            self.evaluation_repo
                .upsert_manager_score(&mut *tx, evaluation_id, score.kpi_id, score.rating as i16, comment)
                .await?;
        }

        let submitted = self.evaluation_repo
            .mark_submitted(&mut *tx, evaluation_id, payload.recommendations.trim())
            .await?;

        tx.commit().await?;

        tracing::info!(evaluation_id = %evaluation_id, scores = payload.scores.len(), "✅ Avaliação enviada pelo gerente");
        Ok(submitted)
    }

    // =========================================================================
    //  RH
    // =========================================================================

    /// Ajustes do RH por nota. O lote inteiro é validado antes; qualquer falha desfaz tudo.
    pub async fn hr_adjust(&self, evaluation_id: Uuid, payload: &HrAdjustPayload) -> Result<Vec<EvaluationScore>, AppError> {
        payload.check()?;

        let mut tx = self.pool.begin().await?;

        self.evaluation_repo.lock_by_id(&mut *tx, evaluation_id).await?;

        let mut updated = Vec::with_capacity(payload.scores.len());
        for adj in &payload.scores {
            let comment = adj.hr_comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
            let score = self.evaluation_repo
                .apply_hr_adjustment(
                    &mut *tx,
                    evaluation_id,
                    adj.score_id,
                    adj.hr_adjusted_score.map(|s| s as i16),
                    comment,
                    adj.show_to_employee,
                )
                .await?;
            updated.push(score);
        }

        tx.commit().await?;

        tracing::info!(evaluation_id = %evaluation_id, scores = updated.len(), "📝 Ajustes do RH gravados");
        Ok(updated)
    }

    /// Publica para o colaborador. Pode ser chamado quantas vezes quiser.
    pub async fn publish(&self, evaluation_id: Uuid) -> Result<Evaluation, AppError> {
        let evaluation = self.evaluation_repo.set_published(&self.pool, evaluation_id).await?;
        tracing::info!(evaluation_id = %evaluation_id, "📢 Avaliação publicada");
        Ok(evaluation)
    }

    /// Cancela uma avaliação ainda não enviada.
    pub async fn cancel(&self, evaluation_id: Uuid) -> Result<Evaluation, AppError> {
        let mut tx = self.pool.begin().await?;

        let evaluation = self.evaluation_repo.lock_by_id(&mut *tx, evaluation_id).await?;
        if let Err(e) = evaluation.ensure_cancellable() {
            tracing::warn!(evaluation_id = %evaluation_id, reason = %e, "Cancelamento rejeitado");
            return Err(e);
        }

        let cancelled = self.evaluation_repo.set_cancelled(&mut *tx, evaluation_id).await?;

        tx.commit().await?;

        tracing::info!(evaluation_id = %evaluation_id, "🚫 Avaliação cancelada");
        Ok(cancelled)
    }

    /// Tela de revisão do RH: avaliação, notas com o KPI congelado e os dois links.
    pub async fn review(&self, evaluation_id: Uuid, company_id: Uuid) -> Result<EvaluationReview, AppError> {
        let evaluation = self.evaluation_repo.find_by_id(&self.pool, evaluation_id).await?;
        let context = self.evaluation_repo.find_context(&self.pool, evaluation_id).await?;
        if context.company_id != company_id {
            return Err(AppError::NotFound);
        }

        let scores = self.evaluation_repo.list_scores(&self.pool, evaluation_id).await?;
        let mut review_scores: Vec<ReviewScore> = scores
            .into_iter()
            .map(|score| {
                let kpi = snapshot_lookup(evaluation.snapshot(), score.kpi_id);
                ReviewScore {
                    kpi_name: kpi.map(|k| k.name.clone()),
                    form_question: kpi.map(|k| k.form_question.clone()),
                    effective_score: score.effective_score(),
                    score,
                }
            })
            .collect();
        review_scores.sort_by_key(|s| {
            snapshot_lookup(evaluation.snapshot(), s.score.kpi_id)
                .map(|k| k.order)
                .unwrap_or(i32::MAX)
        });

        Ok(EvaluationReview {
            status: evaluation.status(),
            employee_name: context.employee_name,
            manager_name: context.manager_name,
            round_number: context.round_number,
            round_status: context.round_status,
            scores: review_scores,
            manager_form_link: self.manager_form_link(&evaluation.manager_form_token),
            employee_view_link: self.employee_view_link(&evaluation.employee_view_token),
            evaluation,
        })
    }

    /// Garante que a avaliação pertence à empresa do caminho da URL.
    pub async fn ensure_in_company(&self, evaluation_id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let context = self.evaluation_repo.find_context(&self.pool, evaluation_id).await?;
        if context.company_id != company_id {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    fn manager_form_link(&self, token: &str) -> String {
        format!("{}/evaluate/{}", self.public_base_url.trim_end_matches('/'), token)
    }

    fn employee_view_link(&self, token: &str) -> String {
        format!("{}/scores/{}", self.public_base_url.trim_end_matches('/'), token)
    }
}
