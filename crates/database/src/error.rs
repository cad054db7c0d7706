use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid store configuration: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Filesystem operation failed: {0}")]
    IoError(#[from] std::io::Error),
}
