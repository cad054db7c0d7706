use crate::error::DbError;
use crate::transaction::UnitOfWork;
use chrono::{DateTime, Utc};
use core_types::PathKind;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A row from the `paths` table: a named, uniquely-keyed filesystem
/// location tagged `source` or `sink`. Records are never mutated in place;
/// the lifecycle is create, then delete.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransferPath {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[sqlx(try_from = "String")]
    pub kind: PathKind,
    pub date_added: DateTime<Utc>,
}

impl TransferPath {
    /// Registers a new path and provisions its directory on disk.
    ///
    /// "Already exists" is an expected, non-exceptional outcome and returns
    /// `Ok(None)`: either the directory is already present on the
    /// filesystem, or the path string is already registered. On success the
    /// record is inserted and the directory is created (one level only, so
    /// a missing parent fails), keeping the registry and the filesystem in
    /// lockstep within the transaction. Store or I/O failures propagate as
    /// errors and roll the scope back.
    pub async fn create(
        uow: &mut UnitOfWork,
        name: &str,
        path: &str,
        kind: PathKind,
    ) -> Result<Option<TransferPath>, DbError> {
        if Path::new(path).exists() {
            debug!(uow = uow.id(), path, "path already exists on disk");
            return Ok(None);
        }
        if Self::get_by_path(uow, path).await?.is_some() {
            debug!(uow = uow.id(), path, "path already registered");
            return Ok(None);
        }

        let record = sqlx::query_as::<_, TransferPath>(
            "INSERT INTO paths (name, path, kind, date_added)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, path, kind, date_added",
        )
        .bind(name)
        .bind(path)
        .bind(kind.as_str())
        .bind(Utc::now())
        .fetch_one(uow.conn())
        .await?;

        fs::create_dir(&record.path)?;
        debug!(uow = uow.id(), id = record.id, path, "path registered");
        Ok(Some(record))
    }

    /// Removes a path record by id. Returns `false` when no such record
    /// exists. The backing directory is deliberately left in place:
    /// deletion is registry-only, never destructive to user data.
    pub async fn delete(uow: &mut UnitOfWork, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM paths WHERE id = ?1")
            .bind(id)
            .execute(uow.conn())
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!(uow = uow.id(), id, "path deleted");
        }
        Ok(removed)
    }

    /// Fetches a path record by id.
    pub async fn get(uow: &mut UnitOfWork, id: i64) -> Result<Option<TransferPath>, DbError> {
        let record = sqlx::query_as::<_, TransferPath>(
            "SELECT id, name, path, kind, date_added FROM paths WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(uow.conn())
        .await?;
        Ok(record)
    }

    /// Fetches a path record by its unique filesystem path.
    pub async fn get_by_path(
        uow: &mut UnitOfWork,
        path: &str,
    ) -> Result<Option<TransferPath>, DbError> {
        let record = sqlx::query_as::<_, TransferPath>(
            "SELECT id, name, path, kind, date_added FROM paths WHERE path = ?1",
        )
        .bind(path)
        .fetch_optional(uow.conn())
        .await?;
        Ok(record)
    }

    /// Fetches every registered path, oldest first.
    pub async fn list(uow: &mut UnitOfWork) -> Result<Vec<TransferPath>, DbError> {
        let records = sqlx::query_as::<_, TransferPath>(
            "SELECT id, name, path, kind, date_added FROM paths ORDER BY id ASC",
        )
        .fetch_all(uow.conn())
        .await?;
        Ok(records)
    }
}
