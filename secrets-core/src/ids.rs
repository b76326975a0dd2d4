use uuid::Uuid;

/// Generate a time-ordered 128-bit id (UUIDv7), as required for every
/// identifier in the data model (design spec §3) and for the audit log's
/// per-record total order (§5: "`created_at` is not a total order ...
/// `id` (UUIDv7) provides a per-record total order").
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}
