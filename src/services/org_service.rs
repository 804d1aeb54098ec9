// src/services/org_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrgRepository,
    models::org::{Company, CompanySummary, Employee, Manager, ManagerSummary},
    services::round_service::RoundService,
};

#[derive(Clone)]
pub struct OrgService {
    org_repo: OrgRepository,
    round_service: RoundService,
    pool: PgPool,
}

impl OrgService {
    pub fn new(org_repo: OrgRepository, round_service: RoundService, pool: PgPool) -> Self {
        Self { org_repo, round_service, pool }
    }

    // --- EMPRESAS ---

    pub async fn create_company(&self, name: &str) -> Result<Company, AppError> {
        self.org_repo.create_company(&self.pool, name.trim()).await
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError> {
        self.org_repo.list_companies().await
    }

    pub async fn get_company(&self, company_id: Uuid) -> Result<Company, AppError> {
        self.org_repo
            .find_active_company(&self.pool, company_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn rename_company(&self, company_id: Uuid, name: &str) -> Result<Company, AppError> {
        self.org_repo.rename_company(&self.pool, company_id, name.trim()).await
    }

    pub async fn delete_company(&self, company_id: Uuid) -> Result<(), AppError> {
        self.org_repo.soft_delete_company(&self.pool, company_id).await
    }

    // --- GERENTES ---

    pub async fn create_manager(&self, company_id: Uuid, name: &str) -> Result<Manager, AppError> {
        let mut tx = self.pool.begin().await?;

        self.org_repo
            .find_active_company(&mut *tx, company_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let manager = self.org_repo.create_manager(&mut *tx, company_id, name.trim()).await?;

        tx.commit().await?;
        Ok(manager)
    }

    pub async fn list_managers(&self, company_id: Uuid) -> Result<Vec<ManagerSummary>, AppError> {
        self.org_repo.list_managers(company_id).await
    }

    pub async fn rename_manager(&self, company_id: Uuid, manager_id: Uuid, name: &str) -> Result<Manager, AppError> {
        self.org_repo.rename_manager(&self.pool, company_id, manager_id, name.trim()).await
    }

    pub async fn delete_manager(&self, company_id: Uuid, manager_id: Uuid) -> Result<(), AppError> {
        self.org_repo.soft_delete_manager(&self.pool, company_id, manager_id).await
    }

    // --- COLABORADORES ---

    /// Cria o colaborador e, na mesma transação, inscreve-o na rodada em andamento (se houver).
    pub async fn create_employee(
        &self,
        company_id: Uuid,
        manager_id: Uuid,
        name: &str,
        role: &str,
    ) -> Result<Employee, AppError> {
        let mut tx = self.pool.begin().await?;

        // Mesma trava da abertura de rodada: o colaborador não "cai entre" duas rodadas
        self.org_repo
            .lock_active_company(&mut *tx, company_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.org_repo
            .find_active_manager(&mut *tx, company_id, manager_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let employee = self.org_repo
            .create_employee(&mut *tx, company_id, manager_id, name.trim(), role.trim())
            .await?;

        self.round_service
            .enroll_employee_in_active_round(&mut *tx, employee.id, company_id, manager_id)
            .await?;

        tx.commit().await?;
        Ok(employee)
    }

    pub async fn list_employees(&self, company_id: Uuid, manager_id: Option<Uuid>) -> Result<Vec<Employee>, AppError> {
        self.org_repo.list_active_employees(&self.pool, company_id, manager_id).await
    }

    pub async fn get_employee(&self, company_id: Uuid, employee_id: Uuid) -> Result<Employee, AppError> {
        self.org_repo
            .find_active_employee(&self.pool, employee_id)
            .await?
            .filter(|e| e.company_id == company_id)
            .ok_or(AppError::NotFound)
    }

    /// Reatribuir o gerente não mexe nas avaliações já criadas
    pub async fn update_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        name: &str,
        role: &str,
        manager_id: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(manager_id) = manager_id {
            self.org_repo
                .find_active_manager(&mut *tx, company_id, manager_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let employee = self.org_repo
            .update_employee(&mut *tx, company_id, employee_id, name.trim(), role.trim(), manager_id)
            .await?;

        tx.commit().await?;
        Ok(employee)
    }

    pub async fn delete_employee(&self, company_id: Uuid, employee_id: Uuid) -> Result<(), AppError> {
        self.org_repo.soft_delete_employee(&self.pool, company_id, employee_id).await
    }
}
