// src/handlers/resource.rs
//
// Os cinco handlers de CRUD, escritos uma vez e instanciados por entidade
// em `routes.rs` (`post(create::<Brand>)`, `get(find_one::<Client>)`...).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    common::{error::AppError, extract::JsonPayload, response::ApiResponse},
    config::AppState,
    models::resource::Resource,
};

// POST /api/<coleção>
pub async fn create<R: Resource>(
    State(app_state): State<AppState>,
    JsonPayload(payload): JsonPayload<R::Create>,
) -> Result<(StatusCode, Json<ApiResponse<R::View>>), AppError> {
    let record = app_state.crud_service.create::<R>(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record.into_view()))))
}

// GET /api/<coleção>
pub async fn list<R: Resource>(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<R::View>>>, AppError> {
    let records = app_state.crud_service.list::<R>().await?;
    let views = records.into_iter().map(R::into_view).collect();
    Ok(Json(ApiResponse::ok(views)))
}

// GET /api/<coleção>/{key}
pub async fn find_one<R: Resource>(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<R::View>>, AppError> {
    let record = app_state.crud_service.find::<R>(&key).await?;
    Ok(Json(ApiResponse::ok(record.into_view())))
}

// PUT /api/<coleção>/{key}
pub async fn update<R: Resource>(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    JsonPayload(patch): JsonPayload<R::Update>,
) -> Result<Json<ApiResponse<R::View>>, AppError> {
    let record = app_state.crud_service.update::<R>(&key, patch).await?;
    Ok(Json(ApiResponse::ok(record.into_view())))
}

// DELETE /api/<coleção>/{key}
pub async fn remove<R: Resource>(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.crud_service.delete::<R>(&key).await?;
    Ok(Json(ApiResponse::message(format!(
        "{} removido(a) com sucesso.",
        R::LABEL
    ))))
}
