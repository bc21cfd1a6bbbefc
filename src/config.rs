// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::Store,
    models::{
        resource::WriteContext,
        user::{CreateUserPayload, Role, User},
    },
    services::{auth::PasswordHasher, AuthService, CrudService, DashboardService},
};

/// Conta criada na primeira subida, quando ainda não há usuários.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub token_ttl_hours: i64,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let admin = match (
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
            env::var("ADMIN_CPF"),
        ) {
            (Ok(email), Ok(senha), Ok(cpf)) => Some(AdminSeed {
                cpf,
                nome: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrador".to_string()),
                email,
                senha,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 168)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            admin,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} inválido: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub crud_service: CrudService,
    pub auth_service: AuthService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Conecta ao Postgres (e roda as migrações) quando há `DATABASE_URL`;
    /// senão, sobe com armazenamento em memória.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Store::postgres(db_pool)
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL ausente: usando armazenamento em memória.");
                Store::in_memory()
            }
        };

        Self::with_store(store, config).await
    }

    /// Monta o estado sobre um `Store` já pronto e semeia o administrador.
    pub async fn with_store(store: Store, config: &Config) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        let state = Self {
            crud_service: CrudService::new(store.clone(), WriteContext::new(hasher)),
            auth_service: AuthService::new(
                store.clone(),
                config.jwt_secret.clone(),
                chrono::Duration::hours(config.token_ttl_hours),
            ),
            dashboard_service: DashboardService::new(store.clone()),
            store,
        };

        if let Some(seed) = &config.admin {
            state.seed_admin(seed).await?;
        }
        Ok(state)
    }

    async fn seed_admin(&self, seed: &AdminSeed) -> anyhow::Result<()> {
        if !self.store.users.list().await?.is_empty() {
            return Ok(());
        }

        let admin = self
            .crud_service
            .create::<User>(CreateUserPayload {
                cpf: seed.cpf.clone(),
                nome: seed.nome.clone(),
                email: seed.email.clone(),
                telefone: None,
                funcao: Role::Administrador,
                senha: seed.senha.clone(),
                status: None,
            })
            .await?;

        tracing::info!("👤 Administrador inicial criado: {}", admin.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bcrypt_cost: u32) -> Config {
        Config {
            database_url: None,
            jwt_secret: "segredo".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            token_ttl_hours: 1,
            db_max_connections: 1,
            bcrypt_cost,
            admin: Some(AdminSeed {
                cpf: "52998224725".to_string(),
                nome: "Administrador".to_string(),
                email: "admin@oficina.com".to_string(),
                senha: "admin123".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn each_state_hashes_with_its_configured_cost() {
        let cheap = AppState::with_store(Store::in_memory(), &config(4)).await.unwrap();
        let dearer = AppState::with_store(Store::in_memory(), &config(5)).await.unwrap();

        let cheap_admin = cheap.store.users.find("52998224725").await.unwrap().unwrap();
        let dearer_admin = dearer.store.users.find("52998224725").await.unwrap().unwrap();
        assert!(cheap_admin.senha.starts_with("$2b$04$"));
        assert!(dearer_admin.senha.starts_with("$2b$05$"));
    }
}
