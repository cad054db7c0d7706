use crate::settings::LoggingSettings;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber.
///
/// When a `[logging]` section is present its filter directive is used;
/// otherwise we fall back to a basic console format at `info` level. A
/// filter that fails to parse also falls back rather than aborting startup.
/// Repeated calls are harmless: only the first subscriber wins.
pub fn init_logging(settings: Option<&LoggingSettings>) {
    let filter = settings
        .map(|s| EnvFilter::try_new(&s.filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .unwrap_or_else(|| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
