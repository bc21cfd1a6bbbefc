// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        auth::{AuthResponse, Claims},
        client::normalize_email,
        user::User,
    },
};

/// Gera hashes bcrypt com o custo configurado (`BCRYPT_COST`).
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    // Executa a verificação em um thread separado
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Store, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .store
            .users
            .find_by("email", &normalize_email(email))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::InvalidCredentials)?;

        // Usuário inativo recebe a mesma resposta de senha errada
        if !user.is_active() {
            return Err(AppError::InvalidCredentials);
        }

        if !verify_password(password.to_owned(), user.senha.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        tracing::info!("🔑 Login de {} ({})", user.email, user.funcao);

        Ok(AuthResponse {
            token,
            usuario: user.into(),
        })
    }

    /// Decodifica o token e recarrega o usuário. Usuário removido ou
    /// inativado perde o acesso na hora, mesmo com token válido.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .store
            .users
            .find(&token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active() {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.cpf.clone(),
            funcao: user.funcao,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
