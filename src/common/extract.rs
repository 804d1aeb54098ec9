// src/common/extract.rs
//
// Entrada das rotas JSON: corpo malformado vira AppError, nomes chegam sem espaços nas pontas.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{Deserialize, Deserializer};

use crate::common::error::AppError;

/// `Json<T>` com a rejeição no formato `{ "error": ... }` da API
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Para `#[serde(deserialize_with)]`: o validator passa a ver o texto já aparado
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Named {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn blank_names_fail_validation_after_trimming() {
        let named: Named = serde_json::from_value(json!({ "name": "   " })).unwrap();
        assert_eq!(named.name, "");
        assert!(named.validate().is_err());
    }

    #[test]
    fn surrounding_spaces_are_dropped() {
        let named: Named = serde_json::from_value(json!({ "name": "  Acme Ltda " })).unwrap();
        assert_eq!(named.name, "Acme Ltda");
        assert!(named.validate().is_ok());
    }
}
