// src/handlers/companies.rs

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

use crate::{
    common::{error::AppError, extract::{trimmed, JsonBody}},
    config::AppState,
    models::org::{Company, CompanySummary},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Company name must be 1 to 100 characters"))]
    #[schema(example = "Acme Ltda")]
    pub name: String,
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.org_service.create_company(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(company)))
}

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresas ativas com contagens", body = Vec<CompanySummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.org_service.list_companies().await?;
    Ok(Json(companies))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.org_service.get_company(company_id).await?;
    Ok(Json(company))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}",
    tag = "Companies",
    request_body = CompanyPayload,
    responses(
        (status = 200, description = "Empresa renomeada", body = Company)
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn rename_company(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    JsonBody(payload): JsonBody<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.org_service.rename_company(company_id, &payload.name).await?;
    Ok(Json(company))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{company_id}",
    tag = "Companies",
    responses(
        (status = 204, description = "Empresa removida (soft delete)")
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.org_service.delete_company(company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
