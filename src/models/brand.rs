// src/models/brand.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Repository, Store},
    models::{
        motorcycle::Motorcycle,
        resource::{ensure_no_dependents, validate_not_blank, KeyKind, Resource, WriteContext},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    pub id: i64,
    pub nome: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrandPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome da marca é obrigatório."),
        length(max = 80, message = "O nome da marca é obrigatório.")
    )]
    pub nome: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBrandPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome da marca é obrigatório."),
        length(max = 80, message = "O nome da marca é obrigatório.")
    )]
    pub nome: Option<String>,
}

#[async_trait]
impl Resource for Brand {
    const LABEL: &'static str = "Marca";
    const NOT_FOUND: &'static str = "Marca não encontrada.";
    const TABLE: &'static str = "marcas";
    const KEY: &'static str = "id";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &["nome"];

    type Create = CreateBrandPayload;
    type Update = UpdateBrandPayload;
    type View = Brand;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.brands.as_ref()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.id = id;
    }

    async fn from_create(
        payload: CreateBrandPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Brand {
            id: 0,
            nome: payload.nome.trim().to_string(),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateBrandPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(nome) = patch.nome {
            self.nome = nome.trim().to_string();
        }
        Ok(())
    }

    fn into_view(self) -> Brand {
        self
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<Motorcycle>(store, "marca_id", key, "Marca possui motocicletas vinculadas.").await
    }
}
