// src/handlers/rounds.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    models::round::{EvaluationRound, RoundOverview},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRoundPayload {
    // Nome vazio é tratado no serviço (RoundNameRequired)
    #[schema(example = "Q3 2025")]
    pub name: String,
}

// POST /api/companies/{company_id}/rounds
#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/rounds",
    tag = "Rounds",
    responses(
        (status = 201, description = "Rodada aberta; a anterior foi encerrada", body = EvaluationRound),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn open_round(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let round = app_state.round_service.open_round(company_id).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/rounds",
    tag = "Rounds",
    responses(
        (status = 200, description = "Rodadas (mais recente primeiro) com as avaliações", body = Vec<RoundOverview>)
    ),
    params(("company_id" = Uuid, Path, description = "ID da Empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_rounds(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let rounds = app_state.round_service.list_rounds(company_id).await?;
    Ok(Json(rounds))
}

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/rounds/{round_id}",
    tag = "Rounds",
    responses(
        (status = 200, description = "Rodada com as avaliações", body = RoundOverview),
        (status = 404, description = "Rodada não encontrada")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("round_id" = Uuid, Path, description = "ID da Rodada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_round(
    State(app_state): State<AppState>,
    Path((company_id, round_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let round = app_state.round_service.get_round(round_id, company_id).await?;
    Ok(Json(round))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}/rounds/{round_id}/name",
    tag = "Rounds",
    request_body = RenameRoundPayload,
    responses(
        (status = 200, description = "Rodada renomeada", body = EvaluationRound),
        (status = 400, description = "Nome vazio"),
        (status = 409, description = "Nome já usado nesta empresa")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("round_id" = Uuid, Path, description = "ID da Rodada")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_round(
    State(app_state): State<AppState>,
    Path((company_id, round_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<RenameRoundPayload>,
) -> Result<impl IntoResponse, AppError> {
    let round = app_state
        .round_service
        .rename_round(round_id, &payload.name, company_id)
        .await?;
    Ok(Json(round))
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/rounds/{round_id}/close",
    tag = "Rounds",
    responses(
        (status = 200, description = "Rodada encerrada", body = EvaluationRound)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("round_id" = Uuid, Path, description = "ID da Rodada")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_round(
    State(app_state): State<AppState>,
    Path((company_id, round_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let round = app_state.round_service.close_round(round_id, company_id).await?;
    Ok(Json(round))
}
