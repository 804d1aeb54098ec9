// src/db/evaluation_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, token::generate_access_token},
    models::{
        evaluation::{Evaluation, EvaluationScore, EvaluationStatus, KpiSnapshotEntry},
        round::{RoundEvaluationRow, RoundStatus},
    },
};

/// Dados de contexto da avaliação (nomes e rodada), lidos mesmo se o colaborador já foi removido
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvaluationContext {
    pub company_id: Uuid,
    pub employee_name: String,
    pub employee_role: String,
    pub manager_name: String,
    pub round_number: i32,
    pub round_status: RoundStatus,
}

// Linha auxiliar da listagem por rodada
#[derive(sqlx::FromRow)]
struct RoundEvaluationRecord {
    id: Uuid,
    employee_id: Uuid,
    employee_name: String,
    manager_id: Uuid,
    manager_name: String,
    manager_submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    hr_published: bool,
    cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Clone)]
pub struct EvaluationRepository {
    pool: PgPool,
}

impl EvaluationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO / LEITURA
    // =========================================================================

    /// Cria a avaliação com dois tokens novos e todos os campos opcionais vazios
    pub async fn create_evaluation<'e, E>(
        &self,
        executor: E,
        round_id: Uuid,
        employee_id: Uuid,
        manager_id: Uuid,
    ) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            INSERT INTO evaluations (
                round_id, employee_id, manager_id, manager_form_token, employee_view_token
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(round_id)
        .bind(employee_id)
        .bind(manager_id)
        .bind(generate_access_token())
        .bind(generate_access_token())
        .fetch_one(executor)
        .await?;

        Ok(evaluation)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Evaluation>("SELECT * FROM evaluations WHERE id = $1")
            .bind(evaluation_id)
            .fetch_one(executor)
            .await
            .map_err(AppError::from_fetch)
    }

    /// Mesmo que `find_by_id`, mas segura a linha até o fim da transação
    pub async fn lock_by_id<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Evaluation>("SELECT * FROM evaluations WHERE id = $1 FOR UPDATE")
            .bind(evaluation_id)
            .fetch_one(executor)
            .await
            .map_err(AppError::from_fetch)
    }

    pub async fn find_by_manager_token<'e, E>(&self, executor: E, token: &str) -> Result<Option<Evaluation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            "SELECT * FROM evaluations WHERE manager_form_token = $1",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;

        Ok(evaluation)
    }

    pub async fn find_by_employee_token<'e, E>(&self, executor: E, token: &str) -> Result<Option<Evaluation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            "SELECT * FROM evaluations WHERE employee_view_token = $1",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;

        Ok(evaluation)
    }

    /// Avaliações da rodada com nomes e estado derivado
    pub async fn list_for_round(&self, round_id: Uuid) -> Result<Vec<RoundEvaluationRow>, AppError> {
        let records = sqlx::query_as::<_, RoundEvaluationRecord>(
            r#"
            SELECT
                ev.id, ev.employee_id, e.name AS employee_name,
                ev.manager_id, m.name AS manager_name,
                ev.manager_submitted_at, ev.hr_published, ev.cancelled_at
            FROM evaluations ev
            JOIN employees e ON e.id = ev.employee_id
            JOIN managers m ON m.id = ev.manager_id
            WHERE ev.round_id = $1
            ORDER BY e.name ASC
            "#,
        )
        .bind(round_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records
            .into_iter()
            .map(|r| RoundEvaluationRow {
                evaluation_id: r.id,
                employee_id: r.employee_id,
                employee_name: r.employee_name,
                manager_id: r.manager_id,
                manager_name: r.manager_name,
                status: EvaluationStatus::derive(
                    r.cancelled_at,
                    r.hr_published,
                    r.manager_submitted_at,
                ),
            })
            .collect())
    }

    pub async fn find_context<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<EvaluationContext, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EvaluationContext>(
            r#"
            SELECT
                r.company_id,
                e.name AS employee_name, e.role AS employee_role,
                m.name AS manager_name,
                r.round_number, r.status AS round_status
            FROM evaluations ev
            JOIN evaluation_rounds r ON r.id = ev.round_id
            JOIN employees e ON e.id = ev.employee_id
            JOIN managers m ON m.id = ev.manager_id
            WHERE ev.id = $1
            "#,
        )
        .bind(evaluation_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    // =========================================================================
    //  SNAPSHOT
    // =========================================================================

    /// Grava o snapshot só se ainda estiver vazio. `None` = outra requisição chegou antes.
    pub async fn write_snapshot_if_absent<'e, E>(
        &self,
        executor: E,
        evaluation_id: Uuid,
        snapshot: &[KpiSnapshotEntry],
    ) -> Result<Option<Evaluation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations
            SET snapshot_kpis = $1, manager_opened = TRUE, updated_at = NOW()
            WHERE id = $2 AND snapshot_kpis IS NULL
            RETURNING *
            "#,
        )
        .bind(Json(snapshot))
        .bind(evaluation_id)
        .fetch_optional(executor)
        .await?;

        Ok(evaluation)
    }

    // =========================================================================
    //  ENVIO DO GERENTE
    // =========================================================================

    /// Cria ou sobrescreve a nota do gerente para o KPI
    pub async fn upsert_manager_score<'e, E>(
        &self,
        executor: E,
        evaluation_id: Uuid,
        kpi_id: Uuid,
        manager_score: i16,
        manager_comment: Option<&str>,
    ) -> Result<EvaluationScore, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let score = sqlx::query_as::<_, EvaluationScore>(
            r#"
            INSERT INTO evaluation_scores (evaluation_id, kpi_id, manager_score, manager_comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (evaluation_id, kpi_id) DO UPDATE
            SET manager_score = EXCLUDED.manager_score,
                manager_comment = EXCLUDED.manager_comment,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(evaluation_id)
        .bind(kpi_id)
        .bind(manager_score)
        .bind(manager_comment)
        .fetch_one(executor)
        .await?;

        Ok(score)
    }

    /// A trava: só grava se ainda não houver envio
    pub async fn mark_submitted<'e, E>(
        &self,
        executor: E,
        evaluation_id: Uuid,
        recommendations: &str,
    ) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations
            SET manager_submitted_at = NOW(), manager_recommendations = $1, updated_at = NOW()
            WHERE id = $2 AND manager_submitted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(recommendations)
        .bind(evaluation_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::AlreadySubmitted)
    }

    // =========================================================================
    //  RH
    // =========================================================================

    pub async fn list_scores<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<Vec<EvaluationScore>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let scores = sqlx::query_as::<_, EvaluationScore>(
            "SELECT * FROM evaluation_scores WHERE evaluation_id = $1 ORDER BY created_at ASC",
        )
        .bind(evaluation_id)
        .fetch_all(executor)
        .await?;

        Ok(scores)
    }

    /// Sobrepõe os campos do RH; os campos do gerente não aparecem aqui
    pub async fn apply_hr_adjustment<'e, E>(
        &self,
        executor: E,
        evaluation_id: Uuid,
        score_id: Uuid,
        hr_adjusted_score: Option<i16>,
        hr_comment: Option<&str>,
        show_to_employee: bool,
    ) -> Result<EvaluationScore, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EvaluationScore>(
            r#"
            UPDATE evaluation_scores
            SET hr_adjusted_score = $1, hr_comment = $2, show_to_employee = $3, updated_at = NOW()
            WHERE id = $4 AND evaluation_id = $5
            RETURNING *
            "#,
        )
        .bind(hr_adjusted_score)
        .bind(hr_comment)
        .bind(show_to_employee)
        .bind(score_id)
        .bind(evaluation_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    pub async fn set_published<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations SET hr_published = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(evaluation_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    /// Mantém o primeiro cancelled_at se já estiver cancelada
    pub async fn set_cancelled<'e, E>(&self, executor: E, evaluation_id: Uuid) -> Result<Evaluation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations SET cancelled_at = COALESCE(cancelled_at, NOW()), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(evaluation_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }
}
