use crate::error::DbError;
use crate::transaction::UnitOfWork;
use configuration::DatabaseSettings;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, warn};

/// The handle to the backing relational store.
///
/// Replaces any notion of process-global engine state: a `Store` is an
/// explicitly constructed value, owned by the process entry point and
/// injected into everything that needs it. All mutations go through
/// transaction-scoped [`UnitOfWork`] handles checked out from it.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Builds the connection pool described by the `[database]` settings.
    ///
    /// The database file is created if it does not exist yet. The pool is
    /// deliberately small: the registry assumes a single logical writer.
    pub async fn configure(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Applies the embedded schema migrations, ensuring the three registry
    /// tables exist and are up to date.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        // Use a relative path from the crate root
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Checks out a fresh unit-of-work handle.
    ///
    /// `auto_commit` decides what [`UnitOfWork::finish`] does on the
    /// success path: persist the changes, or discard them (dry run).
    pub async fn begin(&self, auto_commit: bool) -> Result<UnitOfWork, DbError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork::new(tx, auto_commit))
    }

    /// Runs `f` inside a unit of work and finalizes it.
    ///
    /// On success the handle is finished (commit or discard per
    /// `auto_commit`). On error this is the single rollback point: the
    /// error is logged with the handle id, the pending changes are rolled
    /// back, and the error is re-raised unchanged.
    pub async fn with_transaction<T, F>(&self, auto_commit: bool, f: F) -> Result<T, DbError>
    where
        F: for<'a> FnOnce(&'a mut UnitOfWork) -> BoxFuture<'a, Result<T, DbError>>,
    {
        let mut uow = self.begin(auto_commit).await?;
        match f(&mut uow).await {
            Ok(value) => {
                uow.finish().await?;
                Ok(value)
            }
            Err(e) => {
                error!(uow = uow.id(), error = %e, "transaction failed");
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "rollback after failure also failed");
                }
                Err(e)
            }
        }
    }

    /// Closes the pool. Outstanding handles keep their connections until
    /// they finalize; new checkouts fail afterwards.
    pub async fn shutdown(self) {
        self.pool.close().await;
    }
}
