use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Operations a [`PolicyDoc`] may grant over a path (design spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Read,
    Write,
    Delete,
    Encrypt,
    Decrypt,
    Rotate,
}

/// One path pattern plus the capabilities it grants (§4.6 governs matching).
#[derive(Debug, Clone)]
pub struct PolicyDoc {
    pub path: String,
    pub capabilities: BTreeSet<Capability>,
}

impl PolicyDoc {
    pub fn new(path: impl Into<String>, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            path: path.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }
}

/// A caller of the system. `secret_hash` is a salted Argon2id PHC string;
/// the plaintext secret is returned to the caller exactly once, at creation.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub secret_hash: String,
    pub is_active: bool,
    pub policies: Vec<PolicyDoc>,
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A bearer token record. Only the SHA-256 hash of the plaintext token is
/// stored; the plaintext is returned once, at issuance.
#[derive(Debug, Clone)]
pub struct Token {
    pub id: Uuid,
    pub token_hash: String,
    pub client_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
