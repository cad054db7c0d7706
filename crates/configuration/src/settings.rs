use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    /// Optional logging section; when absent, a plain console subscriber
    /// at `info` level is installed instead.
    pub logging: Option<LoggingSettings>,
}

/// Contains parameters for the backing relational store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// The store connection URL (e.g., "sqlite://portage.db").
    pub url: String,
    /// Upper bound on pooled connections. The registry assumes a single
    /// logical writer, so the default is deliberately small.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Contains parameters for the structured logging subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive string (e.g., "info,database=debug").
    pub filter: String,
}

fn default_max_connections() -> u32 {
    5
}
