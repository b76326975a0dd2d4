use std::collections::HashMap;

use chrono::{DateTime, Utc};
use crypto::Algorithm;
use uuid::Uuid;

/// Token serialization alphabet/length (design spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    Uuid,
    Alphanumeric,
    Numeric,
}

/// `TokenizationKey` — one record per `(name, version)`, same coexistence
/// rule as `TransitKey`.
#[derive(Debug, Clone)]
pub struct TokenizationKey {
    pub id: Uuid,
    pub name: String,
    pub version: i64,
    pub format: TokenFormat,
    pub is_deterministic: bool,
    pub algorithm: Algorithm,
    pub dek_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// `TokenizedValue`. `siv` is set only for deterministic tokens, and is the
/// index used for idempotent re-tokenization of the same plaintext.
#[derive(Debug, Clone)]
pub struct TokenizedValue {
    pub token: String,
    pub tokenization_key_id: Uuid,
    pub tokenization_key_name: String,
    pub tokenization_key_version: i64,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; crypto::aead::NONCE_LEN],
    pub metadata: HashMap<String, String>,
    pub siv: Option<[u8; 32]>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
