//! # Portage Database Crate
//!
//! The transaction-scoped persistence layer for the transfer-rule
//! registry. It is the only component that touches the backing SQLite
//! store, and everything it exposes goes through a unit-of-work handle.
//!
//! ## Architectural Principles
//!
//! - **Explicit lifecycle:** no process-global engine or session factory.
//!   [`Store`] is constructed from settings, passed around by value, and
//!   shut down by its owner.
//! - **Transaction discipline:** every mutation happens inside a
//!   [`UnitOfWork`]; commit is opt-in (`auto_commit`), errors roll back,
//!   and the handle always closes.
//! - **Sentinels for expected outcomes:** "already exists", "not found"
//!   and "duplicate pair" are `Ok(None)` / `Ok(false)` branches, never
//!   errors. Only store and filesystem failures surface as [`DbError`].
//!
//! ## Public API
//!
//! - `Store`: pool construction, migrations, handle checkout, shutdown.
//! - `UnitOfWork`: the transaction-scoped handle.
//! - `TransferPath`, `TransferRule`, `RulePath`: the three record types
//!   with their create/delete/fetch operations.
//! - `run_all`: iterate every rule and run it.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod paths;
pub mod rules;
pub mod transaction;

// Re-export the key components to create a clean, public-facing API.
pub use connection::Store;
pub use error::DbError;
pub use paths::TransferPath;
pub use rules::{run_all, RulePath, RulePathDetail, RunSummary, TransferRule};
pub use transaction::UnitOfWork;
