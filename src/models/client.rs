// src/models/client.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        budget::Budget,
        motorcycle::Motorcycle,
        resource::{
            changed, clean_optional, ensure_no_dependents, ensure_unique, validate_not_blank,
            KeyKind, Resource, WriteContext,
        },
        service_order::ServiceOrder,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sexo {
    M,
    F,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub cpf: String,
    pub nome: String,
    pub sexo: Sexo,
    pub endereco: Option<String>,
    pub telefone: String,
    pub email: String,
    pub profissao: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientPayload {
    #[validate(custom(function = "documents::validate_cpf"))]
    pub cpf: String,

    #[validate(
        custom(function = "validate_not_blank", message = "O nome é obrigatório."),
        length(max = 120, message = "O nome é obrigatório.")
    )]
    pub nome: String,

    pub sexo: Sexo,

    pub endereco: Option<String>,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    pub profissao: Option<String>,

    pub data_nascimento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome é obrigatório."),
        length(max = 120, message = "O nome é obrigatório.")
    )]
    pub nome: Option<String>,

    pub sexo: Option<Sexo>,

    pub endereco: Option<String>,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub profissao: Option<String>,

    pub data_nascimento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckEmailPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl Resource for Client {
    const LABEL: &'static str = "Cliente";
    const NOT_FOUND: &'static str = "Cliente não encontrado.";
    const TABLE: &'static str = "clientes";
    const KEY: &'static str = "cpf";
    const KEY_KIND: KeyKind = KeyKind::Natural;
    const COLUMNS: &'static [&'static str] = &[
        "nome",
        "sexo",
        "endereco",
        "telefone",
        "email",
        "profissao",
        "data_nascimento",
    ];

    type Create = CreateClientPayload;
    type Update = UpdateClientPayload;
    type View = Client;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.clients.as_ref()
    }

    fn key(&self) -> String {
        self.cpf.clone()
    }

    fn normalize_key(raw: &str) -> String {
        documents::only_digits(raw)
    }

    async fn from_create(
        payload: CreateClientPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        Ok(Client {
            cpf: documents::only_digits(&payload.cpf),
            nome: payload.nome.trim().to_string(),
            sexo: payload.sexo,
            endereco: clean_optional(payload.endereco),
            telefone: payload.telefone.trim().to_string(),
            email: normalize_email(&payload.email),
            profissao: clean_optional(payload.profissao),
            data_nascimento: payload.data_nascimento,
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateClientPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(nome) = patch.nome {
            self.nome = nome.trim().to_string();
        }
        if let Some(sexo) = patch.sexo {
            self.sexo = sexo;
        }
        if patch.endereco.is_some() {
            self.endereco = clean_optional(patch.endereco);
        }
        if let Some(telefone) = patch.telefone {
            self.telefone = telefone.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if patch.profissao.is_some() {
            self.profissao = clean_optional(patch.profissao);
        }
        if patch.data_nascimento.is_some() {
            self.data_nascimento = patch.data_nascimento;
        }
        Ok(())
    }

    fn into_view(self) -> Client {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if !changed(before, &self.email, |b| &b.email) {
            return Ok(());
        }
        ensure_unique::<Client>(store, "email", &self.email, &self.cpf, "Este e-mail já está em uso por outro cliente.").await
    }

    async fn check_dependents(key: &str, store: &Store) -> Result<(), AppError> {
        ensure_no_dependents::<Motorcycle>(store, "cliente_cpf", key, "Cliente possui motocicletas vinculadas.").await?;
        ensure_no_dependents::<ServiceOrder>(store, "cliente_cpf", key, "Cliente possui ordens de serviço vinculadas.").await?;
        ensure_no_dependents::<Budget>(store, "cliente_cpf", key, "Cliente possui orçamentos vinculados.").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::PasswordHasher;

    fn ctx() -> WriteContext {
        WriteContext::new(PasswordHasher::new(4))
    }

    fn payload() -> CreateClientPayload {
        CreateClientPayload {
            cpf: "529.982.247-25".into(),
            nome: " Ana Souza ".into(),
            sexo: Sexo::F,
            endereco: Some("   ".into()),
            telefone: "(11) 98888-7777".into(),
            email: " Ana@Email.com ".into(),
            profissao: None,
            data_nascimento: NaiveDate::from_ymd_opt(1990, 5, 20),
        }
    }

    #[tokio::test]
    async fn create_normalizes_fields() {
        let client = Client::from_create(payload(), &ctx()).await.unwrap();
        assert_eq!(client.cpf, "52998224725");
        assert_eq!(client.nome, "Ana Souza");
        assert_eq!(client.email, "ana@email.com");
        assert_eq!(client.endereco, None);
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let mut client = Client::from_create(payload(), &ctx()).await.unwrap();
        let patch = UpdateClientPayload {
            nome: None,
            sexo: None,
            endereco: None,
            telefone: Some("11 3333-4444".into()),
            email: None,
            profissao: Some("Engenheira".into()),
            data_nascimento: None,
        };
        client.apply_update(patch, &ctx()).await.unwrap();

        assert_eq!(client.nome, "Ana Souza");
        assert_eq!(client.telefone, "11 3333-4444");
        assert_eq!(client.profissao.as_deref(), Some("Engenheira"));
        assert_eq!(client.data_nascimento, NaiveDate::from_ymd_opt(1990, 5, 20));
    }

    #[test]
    fn payload_rejects_bad_cpf_and_email() {
        let mut bad = payload();
        bad.cpf = "123.456.789-00".into();
        bad.email = "nao-e-email".into();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cpf"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let mut blank = payload();
        blank.nome = "   ".into();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nome"));
    }
}
