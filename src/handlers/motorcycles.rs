// src/handlers/motorcycles.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::{documents, error::AppError, response::ApiResponse},
    config::AppState,
    models::{client::Client, motorcycle::Motorcycle},
};

// GET /api/motocicletas/cliente/{cpf}
// Cliente inexistente é 404; cliente sem motos devolve lista vazia.
pub async fn by_client(
    State(app_state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<Json<ApiResponse<Vec<Motorcycle>>>, AppError> {
    let cpf = documents::only_digits(&cpf);
    app_state.crud_service.find::<Client>(&cpf).await?;

    let motorcycles = app_state
        .crud_service
        .find_by::<Motorcycle>("cliente_cpf", &cpf)
        .await?;

    Ok(Json(ApiResponse::ok(motorcycles)))
}
