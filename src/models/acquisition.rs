// src/models/acquisition.rs

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Repository, Store},
    models::{
        part::Part,
        resource::{
            changed, clean_optional, ensure_exists, validate_amount, validate_not_blank, KeyKind,
            Resource, WriteContext,
        },
        supplier::Supplier,
    },
};

// Compra de peças/insumos junto a um fornecedor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Acquisition {
    pub id: i64,
    pub descricao: String,
    pub data: NaiveDate,
    pub quantidade: i32,
    pub valor_total: Decimal,
    pub fornecedor_id: Option<i64>,
    pub peca_id: Option<i64>,
    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAcquisitionPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "A descrição é obrigatória."),
        length(max = 200, message = "A descrição é obrigatória.")
    )]
    pub descricao: String,

    pub data: Option<NaiveDate>,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: i32,

    #[validate(custom(function = "validate_amount"))]
    pub valor_total: Decimal,

    pub fornecedor_id: Option<i64>,

    pub peca_id: Option<i64>,

    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAcquisitionPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "A descrição é obrigatória."),
        length(max = 200, message = "A descrição é obrigatória.")
    )]
    pub descricao: Option<String>,

    pub data: Option<NaiveDate>,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: Option<i32>,

    #[validate(custom(function = "validate_amount"))]
    pub valor_total: Option<Decimal>,

    pub fornecedor_id: Option<i64>,

    pub peca_id: Option<i64>,

    pub observacao: Option<String>,
}

#[async_trait]
impl Resource for Acquisition {
    const LABEL: &'static str = "Aquisição";
    const NOT_FOUND: &'static str = "Aquisição não encontrada.";
    const TABLE: &'static str = "aquisicoes";
    const KEY: &'static str = "id";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &[
        "descricao",
        "data",
        "quantidade",
        "valor_total",
        "fornecedor_id",
        "peca_id",
        "observacao",
    ];

    type Create = CreateAcquisitionPayload;
    type Update = UpdateAcquisitionPayload;
    type View = Acquisition;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.acquisitions.as_ref()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.id = id;
    }

    async fn from_create(
        payload: CreateAcquisitionPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Acquisition {
            id: 0,
            descricao: payload.descricao.trim().to_string(),
            data: payload.data.unwrap_or_else(|| Utc::now().date_naive()),
            quantidade: payload.quantidade,
            valor_total: payload.valor_total,
            fornecedor_id: payload.fornecedor_id,
            peca_id: payload.peca_id,
            observacao: clean_optional(payload.observacao),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateAcquisitionPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(descricao) = patch.descricao {
            self.descricao = descricao.trim().to_string();
        }
        if let Some(data) = patch.data {
            self.data = data;
        }
        if let Some(quantidade) = patch.quantidade {
            self.quantidade = quantidade;
        }
        if let Some(valor) = patch.valor_total {
            self.valor_total = valor;
        }
        if patch.fornecedor_id.is_some() {
            self.fornecedor_id = patch.fornecedor_id;
        }
        if patch.peca_id.is_some() {
            self.peca_id = patch.peca_id;
        }
        if patch.observacao.is_some() {
            self.observacao = clean_optional(patch.observacao);
        }
        Ok(())
    }

    fn into_view(self) -> Acquisition {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if changed(before, &self.fornecedor_id, |b| &b.fornecedor_id) {
            if let Some(id) = self.fornecedor_id {
                ensure_exists::<Supplier>(store, &id.to_string()).await?;
            }
        }
        if changed(before, &self.peca_id, |b| &b.peca_id) {
            if let Some(id) = self.peca_id {
                ensure_exists::<Part>(store, &id.to_string()).await?;
            }
        }
        Ok(())
    }
}
