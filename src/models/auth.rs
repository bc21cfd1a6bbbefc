// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{Role, User, UserView};

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub senha: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: UserView,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // CPF do usuário
    pub funcao: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Quem está fazendo a requisição. Inserido nas extensions pelo `auth_guard`.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub funcao: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            cpf: user.cpf.clone(),
            nome: user.nome.clone(),
            email: user.email.clone(),
            funcao: user.funcao,
        }
    }
}
