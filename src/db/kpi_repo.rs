// src/db/kpi_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::org::Kpi};

#[derive(Clone)]
pub struct KpiRepository {
    pool: PgPool,
}

impl KpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acrescenta o KPI no fim da lista do colaborador (posição = máx + 1)
    pub async fn append_kpi<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        name: &str,
        form_question: &str,
    ) -> Result<Kpi, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let kpi = sqlx::query_as::<_, Kpi>(
            r#"
            INSERT INTO kpis (employee_id, name, form_question, position)
            VALUES (
                $1, $2, $3,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM kpis WHERE employee_id = $1)
            )
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(name)
        .bind(form_question)
        .fetch_one(executor)
        .await?;

        Ok(kpi)
    }

    /// KPIs atuais do colaborador, em ordem
    pub async fn list_for_employee<'e, E>(&self, executor: E, employee_id: Uuid) -> Result<Vec<Kpi>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let kpis = sqlx::query_as::<_, Kpi>(
            "SELECT * FROM kpis WHERE employee_id = $1 ORDER BY position ASC",
        )
        .bind(employee_id)
        .fetch_all(executor)
        .await?;

        Ok(kpis)
    }

    pub async fn list(&self, employee_id: Uuid) -> Result<Vec<Kpi>, AppError> {
        self.list_for_employee(&self.pool, employee_id).await
    }

    pub async fn update_kpi<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        kpi_id: Uuid,
        name: &str,
        form_question: &str,
    ) -> Result<Kpi, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Kpi>(
            r#"
            UPDATE kpis SET name = $1, form_question = $2, updated_at = NOW()
            WHERE id = $3 AND employee_id = $4
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(form_question)
        .bind(kpi_id)
        .bind(employee_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    pub async fn delete_kpi<'e, E>(&self, executor: E, employee_id: Uuid, kpi_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM kpis WHERE id = $1 AND employee_id = $2")
            .bind(kpi_id)
            .bind(employee_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn set_position<'e, E>(&self, executor: E, kpi_id: Uuid, position: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE kpis SET position = $1, updated_at = NOW() WHERE id = $2")
            .bind(position)
            .bind(kpi_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
