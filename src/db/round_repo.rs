// src/db/round_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::round::{EvaluationRound, RoundStatus},
};

#[derive(Clone)]
pub struct RoundRepository {
    pool: PgPool,
}

impl RoundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Encerra toda rodada em andamento da empresa. Retorna quantas foram encerradas.
    pub async fn complete_in_progress<'e, E>(&self, executor: E, company_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE evaluation_rounds
            SET status = 'completed', updated_at = NOW()
            WHERE company_id = $1 AND status = 'in_progress'
            "#,
        )
        .bind(company_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn max_round_number<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(round_number) FROM evaluation_rounds WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_one(executor)
        .await?;

        Ok(max)
    }

    pub async fn create_round<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        round_number: i32,
    ) -> Result<EvaluationRound, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let round = sqlx::query_as::<_, EvaluationRound>(
            r#"
            INSERT INTO evaluation_rounds (company_id, round_number, status)
            VALUES ($1, $2, 'in_progress')
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(round_number)
        .fetch_one(executor)
        .await?;

        Ok(round)
    }

    pub async fn find_in_progress<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Option<EvaluationRound>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let round = sqlx::query_as::<_, EvaluationRound>(
            "SELECT * FROM evaluation_rounds WHERE company_id = $1 AND status = 'in_progress'",
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(round)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, round_id: Uuid) -> Result<EvaluationRound, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EvaluationRound>("SELECT * FROM evaluation_rounds WHERE id = $1")
            .bind(round_id)
            .fetch_one(executor)
            .await
            .map_err(AppError::from_fetch)
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<EvaluationRound>, AppError> {
        let rounds = sqlx::query_as::<_, EvaluationRound>(
            "SELECT * FROM evaluation_rounds WHERE company_id = $1 ORDER BY round_number DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rounds)
    }

    /// Outra rodada da mesma empresa já usa esse nome? (comparação exata)
    pub async fn name_taken<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        round_id: Uuid,
        name: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM evaluation_rounds
                WHERE company_id = $1 AND name = $2 AND id <> $3
            )
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(round_id)
        .fetch_one(executor)
        .await?;

        Ok(taken)
    }

    pub async fn rename<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        round_id: Uuid,
        name: &str,
    ) -> Result<EvaluationRound, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EvaluationRound>(
            r#"
            UPDATE evaluation_rounds SET name = $1, updated_at = NOW()
            WHERE id = $2 AND company_id = $3
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(round_id)
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Corrida entre dois renomes: o índice único decide
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::RoundNameTaken;
                }
            }
            AppError::from_fetch(e)
        })
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        round_id: Uuid,
        status: RoundStatus,
    ) -> Result<EvaluationRound, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EvaluationRound>(
            r#"
            UPDATE evaluation_rounds SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(round_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }
}
