// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::dashboard::{DashboardCharts, DashboardStats, RecentOrders},
    services::dashboard_service::RECENT_ORDERS_LIMIT,
};

// GET /api/dashboard/stats
pub async fn stats(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = app_state.dashboard_service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

// GET /api/dashboard/charts
pub async fn charts(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardCharts>>, AppError> {
    let charts = app_state.dashboard_service.charts().await?;
    Ok(Json(ApiResponse::ok(charts)))
}

// GET /api/dashboard/recent-orders
pub async fn recent_orders(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<RecentOrders>>, AppError> {
    let orders = app_state
        .dashboard_service
        .recent_orders(RECENT_ORDERS_LIMIT)
        .await?;
    Ok(Json(ApiResponse::ok(orders)))
}
