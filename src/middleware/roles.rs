// src/middleware/roles.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, models::{auth::Principal, user::Role}};

/// Lista fixa de funções aceitas numa rota. Comparação exata, sem
/// hierarquia: Administrador só passa onde estiver listado.
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Sem principal: 401. Função fora da lista: 403.
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AppError> {
        let principal = principal.ok_or(AppError::InvalidToken)?;
        if self.permits(principal.funcao) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Acesso negado para a função {}.",
                principal.funcao
            )))
        }
    }
}

pub async fn role_guard(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate.check(request.extensions().get::<Principal>())?;
    Ok(next.run(request).await)
}
