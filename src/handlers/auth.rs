// src/handlers/auth.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, extract::JsonPayload, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, LoginPayload},
        user::{Role, User, UserView},
    },
};

// POST /api/usuarios/login
pub async fn login(
    State(app_state): State<AppState>,
    JsonPayload(payload): JsonPayload<LoginPayload>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let auth = app_state
        .auth_service
        .login(&payload.email, &payload.senha)
        .await?;

    Ok(Json(ApiResponse::ok(auth).with_message("Login realizado com sucesso.")))
}

// GET /api/usuarios/me
pub async fn me(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ApiResponse<UserView>>, AppError> {
    let user = app_state.crud_service.find::<User>(&principal.cpf).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

// GET /api/usuarios/mecanicos
pub async fn mechanics(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, AppError> {
    let mechanics = app_state
        .crud_service
        .find_by::<User>("funcao", Role::Mecanico.as_str())
        .await?
        .into_iter()
        .filter(User::is_active)
        .map(UserView::from)
        .collect();

    Ok(Json(ApiResponse::ok(mechanics)))
}
