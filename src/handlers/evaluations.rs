// src/handlers/evaluations.rs
//
// Lado do RH: revisão, ajustes, publicação e cancelamento.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    models::{
        access::EvaluationReview,
        evaluation::{Evaluation, EvaluationScore, HrAdjustPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/evaluations/{evaluation_id}",
    tag = "Evaluations",
    responses(
        (status = 200, description = "Avaliação com notas e links compartilháveis", body = EvaluationReview),
        (status = 404, description = "Avaliação não encontrada")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("evaluation_id" = Uuid, Path, description = "ID da Avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_evaluation(
    State(app_state): State<AppState>,
    Path((company_id, evaluation_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let review = app_state.evaluation_service.review(evaluation_id, company_id).await?;
    Ok(Json(review))
}

#[utoipa::path(
    put,
    path = "/api/companies/{company_id}/evaluations/{evaluation_id}/scores",
    tag = "Evaluations",
    request_body = HrAdjustPayload,
    responses(
        (status = 200, description = "Ajustes do RH gravados", body = Vec<EvaluationScore>),
        (status = 400, description = "Nota inválida ou comentário ausente"),
        (status = 404, description = "Avaliação ou nota não encontrada")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("evaluation_id" = Uuid, Path, description = "ID da Avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn hr_adjust(
    State(app_state): State<AppState>,
    Path((company_id, evaluation_id)): Path<(Uuid, Uuid)>,
    JsonBody(payload): JsonBody<HrAdjustPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.evaluation_service.ensure_in_company(evaluation_id, company_id).await?;

    let scores = app_state.evaluation_service.hr_adjust(evaluation_id, &payload).await?;
    Ok(Json(scores))
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/evaluations/{evaluation_id}/publish",
    tag = "Evaluations",
    responses(
        (status = 200, description = "Avaliação publicada para o colaborador", body = Evaluation)
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("evaluation_id" = Uuid, Path, description = "ID da Avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_evaluation(
    State(app_state): State<AppState>,
    Path((company_id, evaluation_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.evaluation_service.ensure_in_company(evaluation_id, company_id).await?;

    let evaluation = app_state.evaluation_service.publish(evaluation_id).await?;
    Ok(Json(evaluation))
}

#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/evaluations/{evaluation_id}/cancel",
    tag = "Evaluations",
    responses(
        (status = 200, description = "Avaliação cancelada", body = Evaluation),
        (status = 409, description = "Avaliação já enviada pelo gerente")
    ),
    params(
        ("company_id" = Uuid, Path, description = "ID da Empresa"),
        ("evaluation_id" = Uuid, Path, description = "ID da Avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_evaluation(
    State(app_state): State<AppState>,
    Path((company_id, evaluation_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.evaluation_service.ensure_in_company(evaluation_id, company_id).await?;

    let evaluation = app_state.evaluation_service.cancel(evaluation_id).await?;
    Ok(Json(evaluation))
}
