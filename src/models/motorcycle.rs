// src/models/motorcycle.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        brand::Brand,
        client::Client,
        resource::{
            changed, ensure_exists, ensure_no_dependents, validate_not_blank, KeyKind, Resource,
            WriteContext,
        },
        service_order::ServiceOrder,
    },
};

pub const DEFAULT_STATUS: &str = "ativa";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Motorcycle {
    pub placa: String,
    pub modelo: String,
    pub cor: String,
    pub ano: i32,
    pub quilometragem: i64,
    pub marca_id: i64,
    pub cliente_cpf: String,
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMotorcyclePayload {
    #[validate(custom(function = "documents::validate_plate"))]
    pub placa: String,

    #[validate(
        custom(function = "validate_not_blank", message = "O modelo é obrigatório."),
        length(max = 80, message = "O modelo é obrigatório.")
    )]
    pub modelo: String,

    #[validate(
        custom(function = "validate_not_blank", message = "A cor é obrigatória."),
        length(max = 40, message = "A cor é obrigatória.")
    )]
    pub cor: String,

    #[validate(range(min = 1900, max = 2100, message = "Ano inválido."))]
    pub ano: i32,

    #[validate(range(min = 0, message = "A quilometragem não pode ser negativa."))]
    pub quilometragem: Option<i64>,

    pub marca_id: i64,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: String,

    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMotorcyclePayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O modelo é obrigatório."),
        length(max = 80, message = "O modelo é obrigatório.")
    )]
    pub modelo: Option<String>,

    #[validate(
        custom(function = "validate_not_blank", message = "A cor é obrigatória."),
        length(max = 40, message = "A cor é obrigatória.")
    )]
    pub cor: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "Ano inválido."))]
    pub ano: Option<i32>,

    #[validate(range(min = 0, message = "A quilometragem não pode ser negativa."))]
    pub quilometragem: Option<i64>,

    pub marca_id: Option<i64>,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "O status não pode ser vazio."))]
    pub status: Option<String>,
}

#[async_trait]
impl Resource for Motorcycle {
    const LABEL: &'static str = "Motocicleta";
    const NOT_FOUND: &'static str = "Motocicleta não encontrada.";
    const TABLE: &'static str = "motocicletas";
    const KEY: &'static str = "placa";
    const KEY_KIND: KeyKind = KeyKind::Natural;
    const COLUMNS: &'static [&'static str] = &[
        "modelo",
        "cor",
        "ano",
        "quilometragem",
        "marca_id",
        "cliente_cpf",
        "status",
    ];

    type Create = CreateMotorcyclePayload;
    type Update = UpdateMotorcyclePayload;
    type View = Motorcycle;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.motorcycles.as_ref()
    }

    fn key(&self) -> String {
        self.placa.clone()
    }

    fn normalize_key(raw: &str) -> String {
        documents::normalize_plate(raw)
    }

    async fn from_create(
        payload: CreateMotorcyclePayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Motorcycle {
            placa: documents::normalize_plate(&payload.placa),
            modelo: payload.modelo.trim().to_string(),
            cor: payload.cor.trim().to_string(),
            ano: payload.ano,
            quilometragem: payload.quilometragem.unwrap_or(0),
            marca_id: payload.marca_id,
            cliente_cpf: documents::only_digits(&payload.cliente_cpf),
            status: payload
                .status
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateMotorcyclePayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(modelo) = patch.modelo {
            self.modelo = modelo.trim().to_string();
        }
        if let Some(cor) = patch.cor {
            self.cor = cor.trim().to_string();
        }
        if let Some(ano) = patch.ano {
            self.ano = ano;
        }
        if let Some(km) = patch.quilometragem {
            self.quilometragem = km;
        }
        if let Some(marca_id) = patch.marca_id {
            self.marca_id = marca_id;
        }
        if let Some(cpf) = patch.cliente_cpf {
            self.cliente_cpf = documents::only_digits(&cpf);
        }
        if let Some(status) = patch.status {
            self.status = status.trim().to_string();
        }
        Ok(())
    }

    fn into_view(self) -> Motorcycle {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if changed(before, &self.marca_id, |b| &b.marca_id) {
            ensure_exists::<Brand>(store, &self.marca_id.to_string()).await?;
        }
        if changed(before, &self.cliente_cpf, |b| &b.cliente_cpf) {
            ensure_exists::<Client>(store, &self.cliente_cpf).await?;
        }
        Ok(())
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<ServiceOrder>(
            store,
            "motocicleta_placa",
            key,
            "Motocicleta possui ordens de serviço vinculadas.",
        )
        .await
    }
}
