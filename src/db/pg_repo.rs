// src/db/pg_repo.rs

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    common::error::AppError,
    db::Repository,
    models::resource::{KeyKind, Resource},
};

/// Repositório PostgreSQL genérico.
///
/// As linhas vão e voltam como JSON: `to_jsonb(t)` na leitura e
/// `jsonb_populate_record` na escrita, então os nomes de coluna são os
/// mesmos dos campos serializados da entidade.
pub struct PgRepository<R> {
    pool: PgPool,
    _resource: PhantomData<fn() -> R>,
}

impl<R> PgRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _resource: PhantomData,
        }
    }
}

// Identificadores sempre entre aspas: há colunas camelCase (razaoSocial)
fn quoted(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| format!("\"{c}\"")).collect()
}

fn decode<R: Resource>(row: &PgRow) -> Result<R, AppError> {
    let data: Value = row.try_get("data")?;
    Ok(serde_json::from_value(data)?)
}

// Traduz violações de constraint em erros de negócio
fn map_write_error<R: Resource>(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{} já cadastrado(a).", R::LABEL));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::BadRequest(format!("{}: referência inexistente.", R::LABEL));
        }
    }
    e.into()
}

impl<R: Resource> PgRepository<R> {
    fn insert_columns() -> Vec<String> {
        match R::KEY_KIND {
            // A chave serial fica com o DEFAULT da tabela
            KeyKind::Serial => quoted(R::COLUMNS),
            KeyKind::Natural => {
                let mut columns = vec![format!("\"{}\"", R::KEY)];
                columns.extend(quoted(R::COLUMNS));
                columns
            }
        }
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for PgRepository<R> {
    async fn insert(&self, record: R) -> Result<R, AppError> {
        let columns = Self::insert_columns().join(", ");
        let sql = format!(
            "INSERT INTO {table} AS t ({columns}) \
             SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING to_jsonb(t.*) AS data",
            table = R::TABLE,
        );

        let row = sqlx::query(&sql)
            .bind(serde_json::to_value(&record)?)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error::<R>)?;

        decode::<R>(&row)
    }

    async fn list(&self) -> Result<Vec<R>, AppError> {
        let sql = format!(
            "SELECT to_jsonb(t.*) AS data FROM {} t ORDER BY t.\"{}\" ASC",
            R::TABLE,
            R::KEY
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode::<R>).collect()
    }

    async fn find(&self, key: &str) -> Result<Option<R>, AppError> {
        let sql = format!(
            "SELECT to_jsonb(t.*) AS data FROM {} t WHERE t.\"{}\"::text = $1",
            R::TABLE,
            R::KEY
        );

        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode::<R>).transpose()
    }

    async fn find_by(&self, field: &'static str, value: &str) -> Result<Vec<R>, AppError> {
        let sql = format!(
            "SELECT to_jsonb(t.*) AS data FROM {} t WHERE t.\"{}\"::text = $1 ORDER BY t.\"{}\" ASC",
            R::TABLE,
            field,
            R::KEY
        );

        let rows = sqlx::query(&sql).bind(value).fetch_all(&self.pool).await?;
        rows.iter().map(decode::<R>).collect()
    }

    async fn update(&self, key: &str, record: R) -> Result<Option<R>, AppError> {
        let assignments = quoted(R::COLUMNS)
            .iter()
            .map(|c| format!("{c} = src.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} AS t SET {assignments} \
             FROM jsonb_populate_record(NULL::{table}, $1) AS src \
             WHERE t.\"{key_column}\"::text = $2 \
             RETURNING to_jsonb(t.*) AS data",
            table = R::TABLE,
            key_column = R::KEY,
        );

        let row = sqlx::query(&sql)
            .bind(serde_json::to_value(&record)?)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error::<R>)?;

        row.as_ref().map(decode::<R>).transpose()
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} t WHERE t.\"{}\"::text = $1", R::TABLE, R::KEY);

        let result = sqlx::query(&sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(format!("{} possui registros vinculados.", R::LABEL));
                    }
                }
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
