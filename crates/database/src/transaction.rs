use crate::error::DbError;
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// A transaction-scoped handle through which all mutations are performed.
///
/// The handle moves through `OPEN -> (COMMITTED | ROLLED_BACK) -> CLOSED`
/// and never back: `finish` consumes it, committing when the handle was
/// opened with `auto_commit = true` and discarding the pending changes
/// otherwise ("dry-run unless asked to persist"). Dropping an unfinished
/// handle rolls back, so an operation error propagated with `?` leaves
/// nothing behind.
///
/// Handles are independent of one another; the store assumes a single
/// logical writer at a time and defines no cross-handle locking.
pub struct UnitOfWork {
    tx: Option<Transaction<'static, Sqlite>>,
    id: u64,
    auto_commit: bool,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>, auto_commit: bool) -> Self {
        let id = NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(uow = id, auto_commit, "open");
        Self {
            tx: Some(tx),
            id,
            auto_commit,
        }
    }

    /// The process-unique identifier tagging this handle's trace events.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether `finish` will persist or discard the pending changes.
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// The live connection all operations within this scope execute on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        // The inner transaction is only taken by the consuming finalizers,
        // so it is present whenever a `&mut self` method can be called.
        self.tx
            .as_deref_mut()
            .expect("unit of work already finalized")
    }

    /// Finalizes the scope: commit when opened with `auto_commit`, discard
    /// otherwise. Always closes the handle.
    pub async fn finish(mut self) -> Result<(), DbError> {
        let tx = self.tx.take().expect("unit of work already finalized");
        if self.auto_commit {
            debug!(uow = self.id, "commit");
            tx.commit().await?;
        } else {
            debug!(uow = self.id, "rollback");
            tx.rollback().await?;
        }
        debug!(uow = self.id, "close");
        Ok(())
    }

    /// Explicitly discards the pending changes, regardless of `auto_commit`.
    pub async fn rollback(mut self) -> Result<(), DbError> {
        let tx = self.tx.take().expect("unit of work already finalized");
        debug!(uow = self.id, "rollback");
        tx.rollback().await?;
        debug!(uow = self.id, "close");
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        // An unfinished handle going out of scope (usually via `?` on an
        // operation error) discards its pending changes.
        if self.tx.is_some() {
            debug!(uow = self.id, "rollback");
            debug!(uow = self.id, "close");
        }
    }
}
