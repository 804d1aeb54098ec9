// src/handlers/kpis.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::{error::AppError, extract::{trimmed, JsonBody}}, config::AppState, models::org::Kpi};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "KPI name must be 1 to 200 characters"))]
    #[schema(example = "Code quality")]
    pub name: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 500, message = "Form question must be 1 to 500 characters"))]
    #[schema(example = "How would you rate the quality of their code?")]
    pub form_question: String,
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/employees/{employee_id}/kpis",
    tag = "KPIs",
    responses(
        (status = 200, description = "KPIs do colaborador em ordem", body = Vec<Kpi>)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_kpis(
    State(app_state): State<AppState>,
    Path((company_id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let kpis = app_state.kpi_service.list(company_id, employee_id).await?;
    Ok(Json(kpis))
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/employees/{employee_id}/kpis",
    tag = "KPIs",
    request_body = KpiPayload,
    responses(
        (status = 201, description = "KPI adicionado no fim da lista", body = Kpi)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_kpi(
    State(app_state): State<AppState>,
    Path((company_id, employee_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<KpiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let kpi = app_state
        .kpi_service
        .create(company_id, employee_id, &payload.name, &payload.form_question)
        .await?;

    Ok((StatusCode::CREATED, Json(kpi)))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}/employees/{employee_id}/kpis/{kpi_id}",
    tag = "KPIs",
    request_body = KpiPayload,
    responses(
        (status = 200, description = "KPI atualizado", body = Kpi)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador"),
        ("kpi_id" = Uuid, Path, description = "ID do KPI")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_kpi(
    State(app_state): State<AppState>,
    Path((company_id, employee_id, kpi_id)): Path<(Uuid, Uuid, Uuid)>,
    JsonBody(payload): JsonBody<KpiPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let kpi = app_state
        .kpi_service
        .update(company_id, employee_id, kpi_id, &payload.name, &payload.form_question)
        .await?;
    Ok(Json(kpi))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{company_id}/employees/{employee_id}/kpis/{kpi_id}",
    tag = "KPIs",
    responses(
        (status = 200, description = "KPI apagado; devolve a lista renumerada", body = Vec<Kpi>)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador"),
        ("kpi_id" = Uuid, Path, description = "ID do KPI")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_kpi(
    State(app_state): State<AppState>,
    Path((company_id, employee_id, kpi_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let remaining = app_state.kpi_service.delete(company_id, employee_id, kpi_id).await?;
    Ok(Json(remaining))
}
