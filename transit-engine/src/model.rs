use chrono::{DateTime, Utc};
use crypto::Algorithm;
use uuid::Uuid;

/// `TransitKey` — one record per `(name, version)`. Versions of the same
/// name coexist; the highest version is active for encryption, any prior
/// version remains usable for decryption (design spec §4.8).
#[derive(Debug, Clone)]
pub struct TransitKey {
    pub id: Uuid,
    pub name: String,
    pub version: i64,
    pub algorithm: Algorithm,
    pub dek_id: Uuid,
    pub created_at: DateTime<Utc>,
}
