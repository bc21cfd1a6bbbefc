// src/models/supplier.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        acquisition::Acquisition,
        client::normalize_email,
        part::Part,
        resource::{
            changed, clean_optional, ensure_no_dependents, ensure_unique, validate_not_blank,
            KeyKind, Resource, WriteContext,
        },
    },
};

pub const DEFAULT_STATUS: &str = "ativo";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: i64,
    pub cnpj: String,
    #[serde(rename = "razaoSocial")]
    pub razao_social: String,
    #[serde(rename = "nomeFantasia")]
    pub nome_fantasia: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierPayload {
    #[validate(custom(function = "documents::validate_cnpj"))]
    pub cnpj: String,

    #[serde(rename = "razaoSocial", alias = "nome")]
    #[validate(
        custom(function = "validate_not_blank", message = "A razão social é obrigatória."),
        length(max = 150, message = "A razão social é obrigatória.")
    )]
    pub razao_social: String,

    #[serde(rename = "nomeFantasia")]
    pub nome_fantasia: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: Option<String>,

    pub endereco: Option<String>,

    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierPayload {
    #[validate(custom(function = "documents::validate_cnpj"))]
    pub cnpj: Option<String>,

    #[serde(rename = "razaoSocial", alias = "nome")]
    #[validate(
        custom(function = "validate_not_blank", message = "A razão social é obrigatória."),
        length(max = 150, message = "A razão social é obrigatória.")
    )]
    pub razao_social: Option<String>,

    #[serde(rename = "nomeFantasia")]
    pub nome_fantasia: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: Option<String>,

    pub endereco: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "O status não pode ser vazio."))]
    pub status: Option<String>,
}

#[async_trait]
impl Resource for Supplier {
    const LABEL: &'static str = "Fornecedor";
    const NOT_FOUND: &'static str = "Fornecedor não encontrado.";
    const TABLE: &'static str = "fornecedores";
    const KEY: &'static str = "id";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &[
        "cnpj",
        "razaoSocial",
        "nomeFantasia",
        "email",
        "telefone",
        "endereco",
        "status",
    ];

    type Create = CreateSupplierPayload;
    type Update = UpdateSupplierPayload;
    type View = Supplier;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.suppliers.as_ref()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.id = id;
    }

    async fn from_create(
        payload: CreateSupplierPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Supplier {
            id: 0,
            cnpj: documents::only_digits(&payload.cnpj),
            razao_social: payload.razao_social.trim().to_string(),
            nome_fantasia: clean_optional(payload.nome_fantasia),
            email: payload.email.as_deref().map(normalize_email),
            telefone: clean_optional(payload.telefone),
            endereco: clean_optional(payload.endereco),
            status: payload
                .status
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateSupplierPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(cnpj) = patch.cnpj {
            self.cnpj = documents::only_digits(&cnpj);
        }
        if let Some(razao) = patch.razao_social {
            self.razao_social = razao.trim().to_string();
        }
        if patch.nome_fantasia.is_some() {
            self.nome_fantasia = clean_optional(patch.nome_fantasia);
        }
        if let Some(email) = patch.email {
            self.email = Some(normalize_email(&email));
        }
        if patch.telefone.is_some() {
            self.telefone = clean_optional(patch.telefone);
        }
        if patch.endereco.is_some() {
            self.endereco = clean_optional(patch.endereco);
        }
        if let Some(status) = patch.status {
            self.status = status.trim().to_string();
        }
        Ok(())
    }

    fn into_view(self) -> Supplier {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if !changed(before, &self.cnpj, |b| &b.cnpj) {
            return Ok(());
        }
        ensure_unique::<Supplier>(store, "cnpj", &self.cnpj, &self.key(), "Já existe um fornecedor com este CNPJ.").await
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<Part>(store, "fornecedor_id", key, "Fornecedor possui peças vinculadas.").await?;
        ensure_no_dependents::<Acquisition>(store, "fornecedor_id", key, "Fornecedor possui aquisições vinculadas.").await
    }
}
