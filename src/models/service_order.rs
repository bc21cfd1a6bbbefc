// src/models/service_order.rs

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        budget::Budget,
        client::Client,
        motorcycle::Motorcycle,
        resource::{
            amount_overflow, changed, clean_optional, ensure_exists, ensure_no_dependents,
            validate_amount, validate_not_blank, KeyKind, Resource, WriteContext,
        },
    },
};

pub const DEFAULT_STATUS: &str = "Aberta";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceOrder {
    pub cod: i64,
    pub titulo: String,
    pub data: NaiveDate,
    pub descricao: Option<String>,
    pub status: String,
    pub observacao: Option<String>,
    pub valor: Decimal,
    pub valor_mao_de_obra: Decimal,
    pub validada: bool,
    pub cliente_cpf: String,
    pub motocicleta_placa: Option<String>,
}

impl ServiceOrder {
    /// Peças/serviços + mão de obra.
    pub fn total(&self) -> Result<Decimal, AppError> {
        self.valor
            .checked_add(self.valor_mao_de_obra)
            .ok_or_else(amount_overflow)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceOrderPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O título é obrigatório."),
        length(max = 150, message = "O título é obrigatório.")
    )]
    pub titulo: String,

    // Sem data, vale o dia de hoje
    pub data: Option<NaiveDate>,

    pub descricao: Option<String>,

    pub status: Option<String>,

    pub observacao: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub valor: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub valor_mao_de_obra: Option<Decimal>,

    pub validada: Option<bool>,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: String,

    #[validate(custom(function = "documents::validate_plate"))]
    pub motocicleta_placa: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceOrderPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O título é obrigatório."),
        length(max = 150, message = "O título é obrigatório.")
    )]
    pub titulo: Option<String>,

    pub data: Option<NaiveDate>,

    pub descricao: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "O status não pode ser vazio."))]
    pub status: Option<String>,

    pub observacao: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub valor: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub valor_mao_de_obra: Option<Decimal>,

    pub validada: Option<bool>,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: Option<String>,

    #[validate(custom(function = "documents::validate_plate"))]
    pub motocicleta_placa: Option<String>,
}

#[async_trait]
impl Resource for ServiceOrder {
    const LABEL: &'static str = "Ordem de serviço";
    const NOT_FOUND: &'static str = "Ordem de serviço não encontrada.";
    const TABLE: &'static str = "ordens_servico";
    const KEY: &'static str = "cod";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &[
        "titulo",
        "data",
        "descricao",
        "status",
        "observacao",
        "valor",
        "valor_mao_de_obra",
        "validada",
        "cliente_cpf",
        "motocicleta_placa",
    ];

    type Create = CreateServiceOrderPayload;
    type Update = UpdateServiceOrderPayload;
    type View = ServiceOrder;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.service_orders.as_ref()
    }

    fn key(&self) -> String {
        self.cod.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.cod = id;
    }

    async fn from_create(
        payload: CreateServiceOrderPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(ServiceOrder {
            cod: 0,
            titulo: payload.titulo.trim().to_string(),
            data: payload.data.unwrap_or_else(|| Utc::now().date_naive()),
            descricao: clean_optional(payload.descricao),
            status: payload
                .status
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            observacao: clean_optional(payload.observacao),
            valor: payload.valor.unwrap_or(Decimal::ZERO),
            valor_mao_de_obra: payload.valor_mao_de_obra.unwrap_or(Decimal::ZERO),
            validada: payload.validada.unwrap_or(false),
            cliente_cpf: documents::only_digits(&payload.cliente_cpf),
            motocicleta_placa: payload.motocicleta_placa.as_deref().map(documents::normalize_plate),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateServiceOrderPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(titulo) = patch.titulo {
            self.titulo = titulo.trim().to_string();
        }
        if let Some(data) = patch.data {
            self.data = data;
        }
        if patch.descricao.is_some() {
            self.descricao = clean_optional(patch.descricao);
        }
        if let Some(status) = patch.status {
            self.status = status.trim().to_string();
        }
        if patch.observacao.is_some() {
            self.observacao = clean_optional(patch.observacao);
        }
        if let Some(valor) = patch.valor {
            self.valor = valor;
        }
        if let Some(valor) = patch.valor_mao_de_obra {
            self.valor_mao_de_obra = valor;
        }
        if let Some(validada) = patch.validada {
            self.validada = validada;
        }
        if let Some(cpf) = patch.cliente_cpf {
            self.cliente_cpf = documents::only_digits(&cpf);
        }
        if let Some(placa) = patch.motocicleta_placa {
            self.motocicleta_placa = Some(documents::normalize_plate(&placa));
        }
        Ok(())
    }

    fn into_view(self) -> ServiceOrder {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        let client_changed = changed(before, &self.cliente_cpf, |b| &b.cliente_cpf);
        if client_changed {
            ensure_exists::<Client>(store, &self.cliente_cpf).await?;
        }

        // Posse da moto só é conferida quando cliente ou placa mudam
        let plate_changed = changed(before, &self.motocicleta_placa, |b| &b.motocicleta_placa);
        if !(client_changed || plate_changed) {
            return Ok(());
        }

        if let Some(placa) = &self.motocicleta_placa {
            let moto = store
                .motorcycles
                .find(placa)
                .await?
                .ok_or_else(|| AppError::BadRequest(Motorcycle::NOT_FOUND.to_string()))?;

            if moto.cliente_cpf != self.cliente_cpf {
                return Err(AppError::BadRequest(
                    "A motocicleta informada não pertence ao cliente da ordem.".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<Budget>(store, "ordem_servico_cod", key, "Ordem de serviço possui orçamentos vinculados.").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::resource::MAX_AMOUNT, services::auth::PasswordHasher};
    use serde_json::json;

    fn order() -> ServiceOrder {
        ServiceOrder {
            cod: 1,
            titulo: "Revisão".into(),
            data: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            descricao: None,
            status: DEFAULT_STATUS.into(),
            observacao: None,
            valor: Decimal::new(10050, 2),
            valor_mao_de_obra: Decimal::new(5000, 2),
            validada: false,
            cliente_cpf: "52998224725".into(),
            motocicleta_placa: Some("ABC1234".into()),
        }
    }

    #[test]
    fn total_adds_labour() {
        assert_eq!(order().total().unwrap(), Decimal::new(15050, 2));

        let capped = ServiceOrder { valor: MAX_AMOUNT, valor_mao_de_obra: MAX_AMOUNT, ..order() };
        assert_eq!(capped.total().unwrap(), MAX_AMOUNT * Decimal::TWO);

        let absurd = ServiceOrder { valor: Decimal::MAX, valor_mao_de_obra: Decimal::MAX, ..order() };
        assert!(matches!(absurd.total(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn blank_title_and_huge_values_fail_validation() {
        let blank: CreateServiceOrderPayload = serde_json::from_value(json!({
            "titulo": "   ",
            "cliente_cpf": "52998224725"
        }))
        .unwrap();
        assert!(blank.validate().is_err());

        let huge: UpdateServiceOrderPayload =
            serde_json::from_value(json!({ "valor": 1e20 })).unwrap();
        assert!(huge.validate().is_err());
    }

    #[tokio::test]
    async fn unchanged_references_are_not_rechecked() {
        // Armazenamento vazio: qualquer verificação falharia
        let store = Store::in_memory();
        let before = order();

        let mut patched = before.clone();
        let patch: UpdateServiceOrderPayload =
            serde_json::from_value(json!({ "status": "Concluída" })).unwrap();
        patched
            .apply_update(patch, &WriteContext::new(PasswordHasher::new(4)))
            .await
            .unwrap();
        assert!(patched.check_integrity(&store, Some(&before)).await.is_ok());

        patched.motocicleta_placa = Some("XYZ9876".into());
        assert!(matches!(
            patched.check_integrity(&store, Some(&before)).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
