// src/handlers/people.rs
//
// Gerentes e colaboradores de uma empresa.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::{trimmed, JsonBody}},
    config::AppState,
    models::org::{Employee, Manager, ManagerSummary},
};

// =============================================================================
//  1. GERENTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Manager name must be 1 to 100 characters"))]
    #[schema(example = "Joana Souza")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/managers",
    tag = "People",
    request_body = ManagerPayload,
    responses(
        (status = 201, description = "Gerente criado", body = Manager),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_manager(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    JsonBody(payload): JsonBody<ManagerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let manager = app_state.org_service.create_manager(company_id, &payload.name).await?;

    Ok((StatusCode::CREATED, Json(manager)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/managers",
    tag = "People",
    responses(
        (status = 200, description = "Gerentes ativos", body = Vec<ManagerSummary>)
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_managers(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let managers = app_state.org_service.list_managers(company_id).await?;
    Ok(Json(managers))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}/managers/{manager_id}",
    tag = "People",
    request_body = ManagerPayload,
    responses(
        (status = 200, description = "Gerente renomeado", body = Manager)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("manager_id" = Uuid, Path, description = "ID do Gerente")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_manager(
    State(app_state): State<AppState>,
    Path((company_id, manager_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<ManagerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let manager = app_state
        .org_service
        .rename_manager(company_id, manager_id, &payload.name)
        .await?;
    Ok(Json(manager))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{company_id}/managers/{manager_id}",
    tag = "People",
    responses(
        (status = 204, description = "Gerente removido (soft delete)")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("manager_id" = Uuid, Path, description = "ID do Gerente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_manager(
    State(app_state): State<AppState>,
    Path((company_id, manager_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.org_service.delete_manager(company_id, manager_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. COLABORADORES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Employee name must be 1 to 100 characters"))]
    #[schema(example = "Carlos Lima")]
    pub name: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Role must be 1 to 100 characters"))]
    #[schema(example = "Backend Developer")]
    pub role: String,

    pub manager_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Employee name must be 1 to 100 characters"))]
    pub name: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Role must be 1 to 100 characters"))]
    pub role: String,

    // Troca de gerente (opcional); avaliações já criadas mantêm o gerente antigo
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    /// Filtra pelos subordinados de um gerente
    pub manager_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/employees",
    tag = "People",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Colaborador criado (e inscrito na rodada em andamento)", body = Employee),
        (status = 404, description = "Empresa ou gerente não encontrado")
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    JsonBody(payload): JsonBody<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let employee = app_state
        .org_service
        .create_employee(company_id, payload.manager_id, &payload.name, &payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/employees",
    tag = "People",
    responses(
        (status = 200, description = "Colaboradores ativos", body = Vec<Employee>)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        EmployeeListQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state
        .org_service
        .list_employees(company_id, query.manager_id)
        .await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/employees/{employee_id}",
    tag = "People",
    responses(
        (status = 200, description = "Colaborador", body = Employee),
        (status = 404, description = "Colaborador não encontrado")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    Path((company_id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let employee = app_state.org_service.get_employee(company_id, employee_id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}/employees/{employee_id}",
    tag = "People",
    request_body = UpdateEmployeePayload,
    responses(
        (status = 200, description = "Colaborador atualizado", body = Employee)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    Path((company_id, employee_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<UpdateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let employee = app_state
        .org_service
        .update_employee(company_id, employee_id, &payload.name, &payload.role, payload.manager_id)
        .await?;
    Ok(Json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{company_id}/employees/{employee_id}",
    tag = "People",
    responses(
        (status = 204, description = "Colaborador removido (soft delete)")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("employee_id" = Uuid, Path, description = "ID do Colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    Path((company_id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.org_service.delete_employee(company_id, employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
