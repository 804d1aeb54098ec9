use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Todos os erros esperados da aplicação. Cada variante vira um `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Validação ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo JSON inválido: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Nota fora do intervalo 1..5: {0}")]
    InvalidScore(i32),

    #[error("Recomendações obrigatórias")]
    RecommendationsRequired,

    #[error("Nome da rodada obrigatório")]
    RoundNameRequired,

    #[error("Nome de rodada já usado nesta empresa")]
    RoundNameTaken,

    #[error("Comentário do RH obrigatório ao ajustar uma nota")]
    HrCommentRequired,

    #[error("As notas enviadas não batem com os KPIs da avaliação")]
    ScoreSetMismatch,

    // --- Conflito de estado ---
    #[error("Avaliação já enviada")]
    AlreadySubmitted,

    #[error("Rodada encerrada")]
    RoundClosed,

    #[error("Avaliação cancelada")]
    EvaluationCancelled,

    #[error("Formulário ainda não foi aberto")]
    FormNotOpened,

    // --- Não encontrado (id ou token, sem distinção) ---
    #[error("Recurso não encontrado")]
    NotFound,

    // --- Autenticação ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP e mensagem pública de cada variante.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "One or more fields are invalid."),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "Request body is invalid."),
            AppError::InvalidScore(_) => (StatusCode::BAD_REQUEST, "Scores must be whole numbers between 1 and 5."),
            AppError::RecommendationsRequired => (StatusCode::BAD_REQUEST, "Recommendations and Next Steps is required"),
            AppError::RoundNameRequired => (StatusCode::BAD_REQUEST, "Round name is required"),
            AppError::RoundNameTaken => (StatusCode::CONFLICT, "A round with this name already exists for this company"),
            AppError::HrCommentRequired => (StatusCode::BAD_REQUEST, "HR comment required when adjusting a score"),
            AppError::ScoreSetMismatch => (StatusCode::BAD_REQUEST, "Every KPI on the form must be scored exactly once"),

            AppError::AlreadySubmitted => (StatusCode::CONFLICT, "This evaluation has already been submitted"),
            AppError::RoundClosed => (StatusCode::CONFLICT, "This round has been closed"),
            AppError::EvaluationCancelled => (StatusCode::CONFLICT, "This evaluation has been cancelled"),
            AppError::FormNotOpened => (StatusCode::CONFLICT, "This evaluation form has not been opened yet"),

            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found"),

            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password."),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Missing or invalid authentication token."),

            // Todos os outros erros (DatabaseError, InternalServerError, ...) viram 500.
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred."),
        }
    }

    /// Converte `RowNotFound` do sqlx no nosso `NotFound` genérico.
    pub fn from_fetch(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::DatabaseError(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": error_message,
                "details": details,
            }));
            return (status, body).into_response();
        }

        if let AppError::InvalidBody(rejection) = &self {
            let body = Json(json!({
                "error": error_message,
                "details": rejection.body_text(),
            }));
            return (status, body).into_response();
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_generic_not_found() {
        assert!(matches!(AppError::from_fetch(sqlx::Error::RowNotFound), AppError::NotFound));
    }

    #[test]
    fn state_conflicts_have_distinct_messages() {
        let msgs = [
            AppError::AlreadySubmitted.status_and_message(),
            AppError::RoundClosed.status_and_message(),
            AppError::EvaluationCancelled.status_and_message(),
        ];
        assert!(msgs.iter().all(|(s, _)| *s == StatusCode::CONFLICT));
        assert_ne!(msgs[0].1, msgs[1].1);
        assert_ne!(msgs[1].1, msgs[2].1);
    }

    #[test]
    fn store_failures_hide_details() {
        let (status, msg) = AppError::DatabaseError(sqlx::Error::PoolTimedOut).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!msg.contains("pool"));
    }
}
