// src/common/extract.rs

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::common::error::AppError;

/// Extrator de corpo JSON que já valida o payload.
///
/// O `Json` do axum responde 422 quando o corpo não bate com o tipo; aqui
/// toda falha de formato vira `AppError::BadRequest` (400) e falhas do
/// `validator` viram `AppError::ValidationError` (400 com detalhes).
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(format!("Corpo da requisição inválido: {}", rejection.body_text())))?;

        payload.validate()?;

        Ok(JsonPayload(payload))
    }
}
