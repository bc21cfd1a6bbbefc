// src/models/resource.rs
//
// O contrato que cada entidade da oficina implementa para ganhar o CRUD
// genérico (handlers, serviço e repositórios são escritos uma vez só).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    db::{Repository, Store},
    services::auth::PasswordHasher,
};

/// Maior valor monetário aceito: cabe em `NUMERIC(12, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Dependências injetadas na montagem de registros (hash de senha).
#[derive(Debug, Clone, Copy)]
pub struct WriteContext {
    pub hasher: PasswordHasher,
}

impl WriteContext {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }
}

/// Como a chave de um registro nasce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Informada pelo cliente da API (CPF, placa). Duplicatas viram 409.
    Natural,
    /// Gerada pelo armazenamento (sequência).
    Serial,
}

#[async_trait]
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Nome da entidade nas mensagens ("Marca", "Cliente").
    const LABEL: &'static str;
    /// Mensagem de 404 / referência inexistente.
    const NOT_FOUND: &'static str;
    /// Tabela (ou coleção) no armazenamento.
    const TABLE: &'static str;
    /// Campo/coluna da chave.
    const KEY: &'static str;
    const KEY_KIND: KeyKind;
    /// Colunas além da chave, com o mesmo nome do campo JSON.
    const COLUMNS: &'static [&'static str];

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;
    /// O que sai na resposta (o usuário, por exemplo, esconde a senha).
    type View: Serialize + Send + 'static;

    fn repository(store: &Store) -> &dyn Repository<Self>;

    fn key(&self) -> String;

    /// Chamado pelo armazenamento em memória para chaves `Serial`.
    fn assign_serial(&mut self, _id: i64) {}

    /// Normaliza a chave vinda da URL (ex.: CPF com máscara).
    fn normalize_key(raw: &str) -> String {
        raw.trim().to_string()
    }

    async fn from_create(payload: Self::Create, ctx: &WriteContext) -> Result<Self, AppError>;

    /// Atualização parcial: só os campos presentes no payload mudam.
    async fn apply_update(
        &mut self,
        patch: Self::Update,
        ctx: &WriteContext,
    ) -> Result<(), AppError>;

    fn into_view(self) -> Self::View;

    /// Referências e campos únicos, verificados antes de gravar.
    /// `before` é o registro gravado numa atualização (`None` na criação):
    /// referências que não mudaram não são verificadas de novo.
    async fn check_integrity(
        &self,
        _store: &Store,
        _before: Option<&Self>,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Bloqueia a exclusão quando existem registros dependentes.
    async fn check_dependents(_key: &str, _store: &Store) -> Result<(), AppError> {
        Ok(())
    }
}

// =============================================================================
//  Helpers de integridade usados pelas implementações
// =============================================================================

/// Falha com 400 quando `key` não existe na coleção de `R`.
pub async fn ensure_exists<R: Resource>(store: &Store, key: &str) -> Result<(), AppError> {
    match R::repository(store).find(key).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(R::NOT_FOUND.to_string())),
    }
}

/// Falha com 409 quando algum registro de `D` aponta para `key` via `field`.
pub async fn ensure_no_dependents<D: Resource>(
    store: &Store,
    field: &'static str,
    key: &str,
    message: &str,
) -> Result<(), AppError> {
    let dependents = D::repository(store).find_by(field, key).await?;
    if dependents.is_empty() {
        Ok(())
    } else {
        Err(AppError::Conflict(message.to_string()))
    }
}

/// Falha com 409 quando outro registro de `R` (chave diferente de
/// `own_key`) já usa `value` em `field`.
pub async fn ensure_unique<R: Resource>(
    store: &Store,
    field: &'static str,
    value: &str,
    own_key: &str,
    message: &str,
) -> Result<(), AppError> {
    let taken = R::repository(store)
        .find_by(field, value)
        .await?
        .iter()
        .any(|other| other.key() != own_key);

    if taken {
        Err(AppError::Conflict(message.to_string()))
    } else {
        Ok(())
    }
}

/// `true` na criação ou quando o campo difere do registro gravado.
pub fn changed<R, T: PartialEq + ?Sized>(
    before: Option<&R>,
    current: &T,
    field: impl Fn(&R) -> &T,
) -> bool {
    before.is_none_or(|previous| field(previous) != current)
}

pub fn amount_overflow() -> AppError {
    AppError::BadRequest("Valor excede o limite permitido (9.999.999.999,99).".to_string())
}

/// Devolve `value` se couber em `MAX_AMOUNT`.
pub fn within_limit(value: Decimal) -> Result<Decimal, AppError> {
    if value > MAX_AMOUNT {
        Err(amount_overflow())
    } else {
        Ok(value)
    }
}

// --- Validadores de campos ---

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Valor monetário: de zero até `MAX_AMOUNT`.
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("non_negative", "O valor não pode ser negativo."));
    }
    if *value > MAX_AMOUNT {
        return Err(invalid("max_amount", "O valor excede o limite permitido."));
    }
    Ok(())
}

/// Quantidade: maior que zero e até `MAX_AMOUNT`.
pub fn validate_quantity(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(invalid("positive", "O valor deve ser maior que zero."));
    }
    if *value > MAX_AMOUNT {
        return Err(invalid("max_amount", "O valor excede o limite permitido."));
    }
    Ok(())
}

/// Texto obrigatório: não pode ser vazio nem só espaços.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "O campo é obrigatório."));
    }
    Ok(())
}

/// Texto aparado; `None` quando sobra vazio.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
