// src/models/part.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Repository, Store},
    models::{
        acquisition::Acquisition,
        resource::{
            changed, clean_optional, ensure_exists, ensure_no_dependents, validate_amount,
            validate_not_blank, KeyKind, Resource, WriteContext,
        },
        supplier::Supplier,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub valor: Decimal,
    pub fornecedor_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome da peça é obrigatório."),
        length(max = 120, message = "O nome da peça é obrigatório.")
    )]
    pub nome: String,

    pub descricao: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub valor: Decimal,

    pub fornecedor_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePartPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome da peça é obrigatório."),
        length(max = 120, message = "O nome da peça é obrigatório.")
    )]
    pub nome: Option<String>,

    pub descricao: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub valor: Option<Decimal>,

    pub fornecedor_id: Option<i64>,
}

#[async_trait]
impl Resource for Part {
    const LABEL: &'static str = "Peça";
    const NOT_FOUND: &'static str = "Peça não encontrada.";
    const TABLE: &'static str = "pecas";
    const KEY: &'static str = "id";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &["nome", "descricao", "valor", "fornecedor_id"];

    type Create = CreatePartPayload;
    type Update = UpdatePartPayload;
    type View = Part;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.parts.as_ref()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.id = id;
    }

    async fn from_create(
        payload: CreatePartPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Part {
            id: 0,
            nome: payload.nome.trim().to_string(),
            descricao: clean_optional(payload.descricao),
            valor: payload.valor,
            fornecedor_id: payload.fornecedor_id,
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdatePartPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(nome) = patch.nome {
            self.nome = nome.trim().to_string();
        }
        if patch.descricao.is_some() {
            self.descricao = clean_optional(patch.descricao);
        }
        if let Some(valor) = patch.valor {
            self.valor = valor;
        }
        if patch.fornecedor_id.is_some() {
            self.fornecedor_id = patch.fornecedor_id;
        }
        Ok(())
    }

    fn into_view(self) -> Part {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        match self.fornecedor_id {
            Some(id) if changed(before, &self.fornecedor_id, |b| &b.fornecedor_id) => {
                ensure_exists::<Supplier>(store, &id.to_string()).await
            }
            _ => Ok(()),
        }
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<Acquisition>(store, "peca_id", key, "Peça possui aquisições vinculadas.").await?;

        // Itens de orçamento ficam num JSON, sem coluna própria para filtrar
        let Ok(id) = key.parse::<i64>() else {
            return Ok(());
        };
        let quoted = store
            .budgets
            .list()
            .await?
            .iter()
            .any(|budget| budget.part_ids().any(|peca_id| peca_id == id));
        if quoted {
            return Err(AppError::Conflict("Peça possui orçamentos vinculados.".to_string()));
        }
        Ok(())
    }
}
