use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `Secret` — the path-addressed parent record. `path` is normalized: a
/// single leading `/` is stripped, nothing else (design spec §4.5).
#[derive(Debug, Clone)]
pub struct Secret {
    pub id: Uuid,
    pub path: String,
    pub latest_version: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// `SecretVersion` — immutable once written.
#[derive(Debug, Clone)]
pub struct SecretVersion {
    pub secret_id: Uuid,
    pub version: i64,
    pub dek_id: Uuid,
    pub algorithm: crypto::Algorithm,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; crypto::aead::NONCE_LEN],
    pub created_at: DateTime<Utc>,
}

pub fn normalize_path(path: &str) -> String {
    path.strip_prefix('/').unwrap_or(path).to_string()
}
