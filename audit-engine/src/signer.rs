use std::collections::BTreeMap;

use secrets_core::error::{CoreError, CoreResult};
use serde_json::Value;
use uuid::Uuid;

const HMAC_CONTEXT: &[u8] = b"audit-log-hmac-v1";

/// `HMAC-SHA-256(kek_plain, "audit-log-hmac-v1")` (design spec §4.10).
pub fn derive_signing_key(kek_plain: &[u8; 32]) -> CoreResult<[u8; 32]> {
    crypto::kdf::Kdf::hmac_sha256(kek_plain, HMAC_CONTEXT)
        .map_err(|e| CoreError::internal(e.to_string()))
}

/// Byte-exact canonical record: `id || request_id || client_id ||
/// capability || path || created_at_rfc3339_nanos || canonical_json(metadata)`.
/// `canonical_json` sorts keys lexicographically (guaranteed here by using
/// `BTreeMap`, not a hash map, for metadata) with no insignificant whitespace.
#[allow(clippy::too_many_arguments)]
pub fn canonical_record(
    id: Uuid,
    request_id: Uuid,
    client_id: Uuid,
    capability: &str,
    path: &str,
    created_at_rfc3339_nanos: &str,
    metadata: &BTreeMap<String, Value>,
) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(id.as_bytes());
    buf.extend_from_slice(request_id.as_bytes());
    buf.extend_from_slice(client_id.as_bytes());
    buf.extend_from_slice(capability.as_bytes());
    buf.extend_from_slice(path.as_bytes());
    buf.extend_from_slice(created_at_rfc3339_nanos.as_bytes());
    let canonical_json =
        serde_json::to_vec(metadata).map_err(|e| CoreError::internal(e.to_string()))?;
    buf.extend_from_slice(&canonical_json);
    Ok(buf)
}

/// `HMAC-SHA-256(signing_key, canonical_record)`.
pub fn sign(signing_key: &[u8; 32], record: &[u8]) -> CoreResult<[u8; 32]> {
    crypto::kdf::Kdf::hmac_sha256(signing_key, record).map_err(|e| CoreError::internal(e.to_string()))
}
