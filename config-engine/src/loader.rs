use std::time::Duration;

use config::Environment;
use serde::Deserialize;

use crate::duration::parse_duration;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    log_level: Option<String>,
    master_keys: String,
    active_master_key_id: String,
    kms_provider: Option<String>,
    kms_key_uri: Option<String>,
    auth_token_expiration: String,
    lockout_max_attempts: u32,
    lockout_duration: String,
}

/// Typed view of the environment this service starts from. Master-key
/// material is handed to `crypto::MasterKeyChain` unchanged — this crate
/// only owns getting strings out of the environment, not the base64/AEAD
/// parsing inside them.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
    pub master_keys: Vec<(String, String)>,
    pub active_master_key_id: String,
    pub kms_provider: Option<String>,
    pub kms_key_uri: Option<String>,
    pub auth_token_expiration: Duration,
    pub lockout_max_attempts: u32,
    pub lockout_duration: Duration,
}

impl ServiceConfig {
    /// Loads an optional `.env` file, then reads the process environment.
    /// Any missing required variable or malformed value is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Config::builder()
            .add_source(Environment::default().try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Invalid {
                name: "<environment>".to_string(),
                reason: e.to_string(),
            })?;

        let raw: RawConfig = source.try_deserialize().map_err(|e| ConfigError::Missing(e.to_string()))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let master_keys = parse_master_keys(&raw.master_keys)?;
        let auth_token_expiration = parse_duration("AUTH_TOKEN_EXPIRATION", &raw.auth_token_expiration)?;
        let lockout_duration = parse_duration("LOCKOUT_DURATION", &raw.lockout_duration)?;

        Ok(Self {
            log_level: raw.log_level.unwrap_or_else(|| "info".to_string()),
            master_keys,
            active_master_key_id: raw.active_master_key_id,
            kms_provider: raw.kms_provider,
            kms_key_uri: raw.kms_key_uri,
            auth_token_expiration,
            lockout_max_attempts: raw.lockout_max_attempts,
            lockout_duration,
        })
    }
}

/// `id1:b64,id2:b64,...` → `[(id1, b64), (id2, b64), ...]`. Base64 decoding
/// and the 32-byte length check live in `crypto::MasterKeyChain`.
fn parse_master_keys(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(',')
        .map(|entry| {
            entry
                .split_once(':')
                .map(|(id, material)| (id.to_string(), material.to_string()))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "MASTER_KEYS".to_string(),
                    reason: format!("entry '{entry}' is not of the form id:base64"),
                })
        })
        .collect()
}
