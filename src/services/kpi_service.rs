// src/services/kpi_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{KpiRepository, OrgRepository},
    models::org::{dense_order_plan, Kpi},
};

#[derive(Clone)]
pub struct KpiService {
    kpi_repo: KpiRepository,
    org_repo: OrgRepository,
    pool: PgPool,
}

impl KpiService {
    pub fn new(kpi_repo: KpiRepository, org_repo: OrgRepository, pool: PgPool) -> Self {
        Self { kpi_repo, org_repo, pool }
    }

    async fn ensure_employee(&self, company_id: Uuid, employee_id: Uuid) -> Result<(), AppError> {
        self.org_repo
            .find_active_employee(&self.pool, employee_id)
            .await?
            .filter(|e| e.company_id == company_id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    pub async fn list(&self, company_id: Uuid, employee_id: Uuid) -> Result<Vec<Kpi>, AppError> {
        self.ensure_employee(company_id, employee_id).await?;
        self.kpi_repo.list(employee_id).await
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        name: &str,
        form_question: &str,
    ) -> Result<Kpi, AppError> {
        let mut tx = self.pool.begin().await?;

        // Com o colaborador travado, dois cadastros simultâneos não disputam a mesma posição
        self.org_repo
            .lock_active_employee(&mut *tx, employee_id)
            .await?
            .filter(|e| e.company_id == company_id)
            .ok_or(AppError::NotFound)?;

        let kpi = self.kpi_repo
            .append_kpi(&mut *tx, employee_id, name.trim(), form_question.trim())
            .await?;

        tx.commit().await?;
        Ok(kpi)
    }

    /// Editar o texto não afeta avaliações que já congelaram o KPI
    pub async fn update(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        kpi_id: Uuid,
        name: &str,
        form_question: &str,
    ) -> Result<Kpi, AppError> {
        self.ensure_employee(company_id, employee_id).await?;
        self.kpi_repo
            .update_kpi(&self.pool, employee_id, kpi_id, name.trim(), form_question.trim())
            .await
    }

    /// Apaga o KPI e renumera os restantes para 1..N, na mesma transação
    pub async fn delete(&self, company_id: Uuid, employee_id: Uuid, kpi_id: Uuid) -> Result<Vec<Kpi>, AppError> {
        let mut tx = self.pool.begin().await?;

        self.org_repo
            .lock_active_employee(&mut *tx, employee_id)
            .await?
            .filter(|e| e.company_id == company_id)
            .ok_or(AppError::NotFound)?;

        self.kpi_repo.delete_kpi(&mut *tx, employee_id, kpi_id).await?;

        let remaining = self.kpi_repo.list_for_employee(&mut *tx, employee_id).await?;
        for (id, position) in dense_order_plan(&remaining) {
            self.kpi_repo.set_position(&mut *tx, id, position).await?;
        }

        let renumbered = self.kpi_repo.list_for_employee(&mut *tx, employee_id).await?;

        tx.commit().await?;
        Ok(renumbered)
    }
}
