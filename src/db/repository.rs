// src/db/repository.rs

use async_trait::async_trait;

use crate::{common::error::AppError, models::resource::Resource};

/// A interface de armazenamento injetada nos serviços.
///
/// Chaves e filtros trafegam como texto: `find_by("marca_id", "3")`
/// compara a representação textual do campo, igual nas duas implementações.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Grava um registro novo. Chave natural repetida vira `AppError::Conflict`.
    async fn insert(&self, record: R) -> Result<R, AppError>;

    async fn list(&self) -> Result<Vec<R>, AppError>;

    async fn find(&self, key: &str) -> Result<Option<R>, AppError>;

    async fn find_by(&self, field: &'static str, value: &str) -> Result<Vec<R>, AppError>;

    /// Substitui o registro inteiro; `None` quando a chave não existe.
    async fn update(&self, key: &str, record: R) -> Result<Option<R>, AppError>;

    /// `false` quando a chave não existe.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}
