// src/models/user.rs

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        client::normalize_email,
        resource::{
            changed, clean_optional, ensure_unique, validate_not_blank, KeyKind, Resource,
            WriteContext,
        },
    },
};

/// Função do usuário na oficina. É o que o Role Gate compara.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrador,
    #[serde(rename = "Secretária")]
    Secretaria,
    #[serde(rename = "Mecânico")]
    Mecanico,
    Atendente,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Administrador,
        Role::Secretaria,
        Role::Mecanico,
        Role::Atendente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrador => "Administrador",
            Role::Secretaria => "Secretária",
            Role::Mecanico => "Mecânico",
            Role::Atendente => "Atendente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Ativo,
    Inativo,
}

// Representa um usuário como fica no armazenamento
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub funcao: Role,
    // Hash bcrypt. Nunca sai na resposta (ver `UserView`).
    pub senha: String,
    pub status: UserStatus,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Ativo
    }
}

/// O usuário como aparece na API: sem a senha.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserView {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub funcao: Role,
    pub status: UserStatus,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            cpf: user.cpf,
            nome: user.nome,
            email: user.email,
            telefone: user.telefone,
            funcao: user.funcao,
            status: user.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(custom(function = "documents::validate_cpf"))]
    pub cpf: String,

    #[validate(
        custom(function = "validate_not_blank", message = "O nome é obrigatório."),
        length(max = 120, message = "O nome é obrigatório.")
    )]
    pub nome: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: Option<String>,

    pub funcao: Role,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,

    pub status: Option<UserStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(
        custom(function = "validate_not_blank", message = "O nome é obrigatório."),
        length(max = 120, message = "O nome é obrigatório.")
    )]
    pub nome: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 20, message = "Telefone inválido."))]
    pub telefone: Option<String>,

    pub funcao: Option<Role>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: Option<String>,

    pub status: Option<UserStatus>,
}

#[async_trait]
impl Resource for User {
    const LABEL: &'static str = "Usuário";
    const NOT_FOUND: &'static str = "Usuário não encontrado.";
    const TABLE: &'static str = "usuarios";
    const KEY: &'static str = "cpf";
    const KEY_KIND: KeyKind = KeyKind::Natural;
    const COLUMNS: &'static [&'static str] = &["nome", "email", "telefone", "funcao", "senha", "status"];

    type Create = CreateUserPayload;
    type Update = UpdateUserPayload;
    type View = UserView;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.users.as_ref()
    }

    fn key(&self) -> String {
        self.cpf.clone()
    }

    fn normalize_key(raw: &str) -> String {
        documents::only_digits(raw)
    }

    async fn from_create(payload: CreateUserPayload, ctx: &WriteContext) -> Result<Self, AppError> {
        let senha = ctx.hasher.hash(payload.senha).await?;

        Ok(User {
            cpf: documents::only_digits(&payload.cpf),
            nome: payload.nome.trim().to_string(),
            email: normalize_email(&payload.email),
            telefone: clean_optional(payload.telefone),
            funcao: payload.funcao,
            senha,
            status: payload.status.unwrap_or_default(),
        })
    }

    async fn apply_update(
        &mut self,
        patch: UpdateUserPayload,
        ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(nome) = patch.nome {
            self.nome = nome.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if patch.telefone.is_some() {
            self.telefone = clean_optional(patch.telefone);
        }
        if let Some(funcao) = patch.funcao {
            self.funcao = funcao;
        }
        if let Some(senha) = patch.senha {
            self.senha = ctx.hasher.hash(senha).await?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }

    fn into_view(self) -> UserView {
        self.into()
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if !changed(before, &self.email, |b| &b.email) {
            return Ok(());
        }
        ensure_unique::<User>(store, "email", &self.email, &self.cpf, "Este e-mail já está em uso.").await
    }
}
