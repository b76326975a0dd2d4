/// Logging configuration. Currently just the filter directive; kept as its
/// own type so a caller can build it without reaching into env vars
/// directly (mirrors `config-engine::ServiceConfig::log_level`).
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new(log_level: impl Into<String>) -> Self {
        Self {
            log_level: log_level.into(),
        }
    }
}
