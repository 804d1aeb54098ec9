// src/models/org.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Company (a "Organização" avaliada)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Acme Ltda")]
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Empresa + contagens ativas (para a listagem)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub manager_count: i64,
    pub employee_count: i64,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. Manager (quem preenche as avaliações)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "Joana Souza")]
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSummary {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub employee_count: i64,
    pub created_at: DateTime<Utc>,
}

// ---
// 3. Employee (quem é avaliado)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub manager_id: Uuid,
    #[schema(example = "Carlos Lima")]
    pub name: String,
    #[schema(example = "Backend Developer")]
    pub role: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 4. Kpi (as perguntas do formulário, ordenadas)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: Uuid,
    pub employee_id: Uuid,
    #[schema(example = "Code quality")]
    pub name: String,
    #[schema(example = "How would you rate the quality of their code?")]
    pub form_question: String,
    // "order" é palavra reservada no SQL
    #[sqlx(rename = "position")]
    #[schema(example = 1)]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plano de renumeração: pares (id, nova posição) só para os KPIs fora do lugar.
/// Recebe a lista já ordenada por posição.
pub fn dense_order_plan(kpis: &[Kpi]) -> Vec<(Uuid, i32)> {
    kpis.iter()
        .zip(1..)
        .filter(|(kpi, expected)| kpi.order != *expected)
        .map(|(kpi, expected)| (kpi.id, expected))
        .collect()
}
