use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;

/// Installs the global `tracing` subscriber with a `LOG_LEVEL`-driven
/// filter and JSON-formatted output. Call once at process startup.
pub fn init_tracing(config: &LoggerConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}
