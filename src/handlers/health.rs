// src/handlers/health.rs

use axum::Json;
use serde_json::{json, Value};

use crate::common::response::ApiResponse;

// GET /api/health
pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({ "status": "OK" })))
}
