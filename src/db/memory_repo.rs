// src/db/memory_repo.rs

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::Repository,
    models::resource::{KeyKind, Resource},
};

/// Armazenamento em memória, usado sem `DATABASE_URL` e nos testes.
/// Mantém a ordem de inserção.
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
    next_id: AtomicI64,
}

impl<R> MemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

// Representação textual de um campo, a mesma que `campo::text` daria no Postgres
fn field_text<R: Resource>(record: &R, field: &str) -> Result<Option<String>, AppError> {
    let value = serde_json::to_value(record)?;
    Ok(match value.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

#[async_trait]
impl<R: Resource> Repository<R> for MemoryRepository<R> {
    async fn insert(&self, mut record: R) -> Result<R, AppError> {
        let mut records = self.records.write().await;

        match R::KEY_KIND {
            KeyKind::Serial => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                record.assign_serial(id);
            }
            KeyKind::Natural => {
                let key = record.key();
                if records.iter().any(|r| r.key() == key) {
                    return Err(AppError::Conflict(format!(
                        "{} já cadastrado(a) com a chave '{}'.",
                        R::LABEL,
                        key
                    )));
                }
            }
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<R>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn find(&self, key: &str) -> Result<Option<R>, AppError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.key() == key).cloned())
    }

    async fn find_by(&self, field: &'static str, value: &str) -> Result<Vec<R>, AppError> {
        let records = self.records.read().await;
        let mut found = Vec::new();
        for record in records.iter() {
            if field_text(record, field)?.as_deref() == Some(value) {
                found.push(record.clone());
            }
        }
        Ok(found)
    }

    async fn update(&self, key: &str, record: R) -> Result<Option<R>, AppError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.key() == key) {
            Some(slot) => {
                *slot = record.clone();
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.key() != key);
        Ok(records.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        brand::Brand,
        client::{Client, Sexo},
        motorcycle::Motorcycle,
    };

    fn client(cpf: &str) -> Client {
        Client {
            cpf: cpf.to_string(),
            nome: "Ana".into(),
            sexo: Sexo::F,
            endereco: None,
            telefone: "11988887777".into(),
            email: format!("{cpf}@email.com"),
            profissao: None,
            data_nascimento: None,
        }
    }

    #[tokio::test]
    async fn serial_keys_are_assigned_in_order() {
        let repo = MemoryRepository::<Brand>::new();
        let honda = repo.insert(Brand { id: 0, nome: "Honda".into() }).await.unwrap();
        let yamaha = repo.insert(Brand { id: 0, nome: "Yamaha".into() }).await.unwrap();

        assert_eq!(honda.id, 1);
        assert_eq!(yamaha.id, 2);
        assert_eq!(repo.find("2").await.unwrap(), Some(yamaha));
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_natural_key_is_a_conflict() {
        let repo = MemoryRepository::<Client>::new();
        repo.insert(client("52998224725")).await.unwrap();

        let err = repo.insert(client("52998224725")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_by_compares_textual_value() {
        let repo = MemoryRepository::<Motorcycle>::new();
        for (placa, marca) in [("ABC1234", 1), ("BRA2E19", 2), ("XYZ9876", 1)] {
            repo.insert(Motorcycle {
                placa: placa.into(),
                modelo: "CG".into(),
                cor: "Preta".into(),
                ano: 2020,
                quilometragem: 0,
                marca_id: marca,
                cliente_cpf: "52998224725".into(),
                status: "ativa".into(),
            })
            .await
            .unwrap();
        }

        let honda = repo.find_by("marca_id", "1").await.unwrap();
        assert_eq!(honda.len(), 2);
        assert!(repo.find_by("marca_id", "3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_keys() {
        let repo = MemoryRepository::<Brand>::new();
        assert_eq!(repo.update("9", Brand { id: 9, nome: "X".into() }).await.unwrap(), None);
        assert!(!repo.delete("9").await.unwrap());

        repo.insert(Brand { id: 0, nome: "Suzuki".into() }).await.unwrap();
        assert!(repo.delete("1").await.unwrap());
        assert_eq!(repo.find("1").await.unwrap(), None);
    }
}
