// src/handlers/public.rs
//
// Rotas públicas: o token do link é a única credencial.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    models::{
        access::{EmployeeResultsView, ManagerFormView},
        evaluation::SubmitEvaluationPayload,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
}

#[utoipa::path(
    get,
    path = "/api/evaluate/{token}",
    tag = "Public",
    responses(
        (status = 200, description = "Estado do formulário do gerente", body = ManagerFormView),
        (status = 404, description = "Link inválido")
    ),
    params(("token" = String, Path, description = "Token do link do gerente"))
)]
pub async fn get_manager_form(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.access_service.manager_form(&token).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/evaluate/{token}",
    tag = "Public",
    request_body = SubmitEvaluationPayload,
    responses(
        (status = 200, description = "Avaliação enviada", body = SubmitResponse),
        (status = 400, description = "Nota inválida ou recomendações ausentes"),
        (status = 404, description = "Link inválido"),
        (status = 409, description = "Já enviada, rodada encerrada ou cancelada")
    ),
    params(("token" = String, Path, description = "Token do link do gerente"))
)]
pub async fn submit_manager_form(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    JsonBody(payload): JsonBody<SubmitEvaluationPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.access_service.submit_by_token(&token, &payload).await?;
    Ok(Json(SubmitResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/scores/{token}",
    tag = "Public",
    responses(
        (status = 200, description = "Resultado do colaborador (ou notPublished)", body = EmployeeResultsView),
        (status = 404, description = "Link inválido")
    ),
    params(("token" = String, Path, description = "Token do link do colaborador"))
)]
pub async fn get_employee_results(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.access_service.employee_results(&token).await?;
    Ok(Json(view))
}
