use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// One audit record (design spec §3). `is_signed=true` iff `kek_id` is
/// present and `signature` is exactly 32 bytes; a legacy (unsigned) record
/// has `is_signed=false`, `kek_id=None`, `signature=empty`.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pub id: Uuid,
    pub request_id: Uuid,
    pub client_id: Uuid,
    pub capability: String,
    pub path: String,
    pub metadata: BTreeMap<String, Value>,
    pub signature: Vec<u8>,
    pub kek_id: Option<Uuid>,
    pub is_signed: bool,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn is_legacy(&self) -> bool {
        !self.is_signed
    }
}
