// src/handlers/clients.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, extract::JsonPayload, response::ApiResponse},
    config::AppState,
    models::client::{normalize_email, CheckEmailPayload, CheckEmailResponse, Client},
};

// POST /api/clientes/check-email
pub async fn check_email(
    State(app_state): State<AppState>,
    JsonPayload(payload): JsonPayload<CheckEmailPayload>,
) -> Result<Json<ApiResponse<CheckEmailResponse>>, AppError> {
    let matches = app_state
        .crud_service
        .find_by::<Client>("email", &normalize_email(&payload.email))
        .await?;

    Ok(Json(ApiResponse::ok(CheckEmailResponse {
        exists: !matches.is_empty(),
    })))
}
