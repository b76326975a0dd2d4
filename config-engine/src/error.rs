use secrets_core::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable '{0}'")]
    Missing(String),

    #[error("invalid value for '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        CoreError::configuration(err.to_string())
    }
}
