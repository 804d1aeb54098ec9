// src/db/org_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::org::{Company, CompanySummary, Employee, Manager, ManagerSummary},
};

// Empresas, gerentes e colaboradores. Toda leitura padrão filtra deleted_at IS NULL.
#[derive(Clone)]
pub struct OrgRepository {
    pool: PgPool,
}

impl OrgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  EMPRESAS
    // =========================================================================

    pub async fn create_company<'e, E>(&self, executor: E, name: &str) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    /// Lista empresas ativas com a contagem de gerentes e colaboradores ativos
    pub async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError> {
        let companies = sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT
                c.id, c.name, c.created_at,
                (SELECT COUNT(*) FROM managers m WHERE m.company_id = c.id AND m.deleted_at IS NULL) AS manager_count,
                (SELECT COUNT(*) FROM employees e WHERE e.company_id = c.id AND e.deleted_at IS NULL) AS employee_count
            FROM companies c
            WHERE c.deleted_at IS NULL
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    pub async fn find_active_company<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    /// Trava a linha da empresa até o fim da transação (serializa abertura de rodadas)
    pub async fn lock_active_company<'e, E>(&self, executor: E, company_id: Uuid) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }

    pub async fn rename_company<'e, E>(&self, executor: E, company_id: Uuid, name: &str) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET name = $1, updated_at = NOW()
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    pub async fn soft_delete_company<'e, E>(&self, executor: E, company_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(company_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  GERENTES
    // =========================================================================

    pub async fn create_manager<'e, E>(&self, executor: E, company_id: Uuid, name: &str) -> Result<Manager, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            "INSERT INTO managers (company_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(manager)
    }

    pub async fn list_managers(&self, company_id: Uuid) -> Result<Vec<ManagerSummary>, AppError> {
        let managers = sqlx::query_as::<_, ManagerSummary>(
            r#"
            SELECT
                m.id, m.company_id, m.name, m.created_at,
                (SELECT COUNT(*) FROM employees e WHERE e.manager_id = m.id AND e.deleted_at IS NULL) AS employee_count
            FROM managers m
            WHERE m.company_id = $1 AND m.deleted_at IS NULL
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(managers)
    }

    pub async fn find_active_manager<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        manager_id: Uuid,
    ) -> Result<Option<Manager>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manager = sqlx::query_as::<_, Manager>(
            "SELECT * FROM managers WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL",
        )
        .bind(manager_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(manager)
    }

    pub async fn rename_manager<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        manager_id: Uuid,
        name: &str,
    ) -> Result<Manager, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Manager>(
            r#"
            UPDATE managers SET name = $1, updated_at = NOW()
            WHERE id = $2 AND company_id = $3 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(manager_id)
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    pub async fn soft_delete_manager<'e, E>(&self, executor: E, company_id: Uuid, manager_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE managers SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(manager_id)
        .bind(company_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  COLABORADORES
    // =========================================================================

    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        manager_id: Uuid,
        name: &str,
        role: &str,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (company_id, manager_id, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(manager_id)
        .bind(name)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(employee)
    }

    /// Colaboradores ativos; com `manager_id` filtra pelo gerente
    pub async fn list_active_employees<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE company_id = $1
              AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR manager_id = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(manager_id)
        .fetch_all(executor)
        .await?;

        Ok(employees)
    }

    pub async fn find_active_employee<'e, E>(&self, executor: E, employee_id: Uuid) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(employee_id)
        .fetch_optional(executor)
        .await?;

        Ok(employee)
    }

    /// Trava o colaborador até o fim da transação (serializa a numeração dos KPIs)
    pub async fn lock_active_employee<'e, E>(&self, executor: E, employee_id: Uuid) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(employee_id)
        .fetch_optional(executor)
        .await?;

        Ok(employee)
    }

    /// Atualiza nome/cargo e, se vier, o gerente. Avaliações já criadas não mudam.
    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        employee_id: Uuid,
        name: &str,
        role: &str,
        manager_id: Option<Uuid>,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = $1, role = $2, manager_id = COALESCE($3, manager_id), updated_at = NOW()
            WHERE id = $4 AND company_id = $5 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(role)
        .bind(manager_id)
        .bind(employee_id)
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_fetch)
    }

    pub async fn soft_delete_employee<'e, E>(&self, executor: E, company_id: Uuid, employee_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE employees SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(employee_id)
        .bind(company_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
