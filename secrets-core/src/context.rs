use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::new_id;
use crate::txn::TxScope;

/// Per-request context threaded explicitly through service calls, per the
/// Design Notes: "Request context carries: request id, authenticated client
/// id, deadline, optional transaction handle. Thread it explicitly — no
/// task-local storage."
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub client_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub tx: TxScope,
}

impl RequestContext {
    /// A fresh context for a new inbound request, with no transaction yet
    /// open and no deadline set.
    pub fn new() -> Self {
        Self {
            request_id: new_id(),
            client_id: None,
            deadline: None,
            tx: TxScope::Connection,
        }
    }

    pub fn with_client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_tx(mut self, tx: TxScope) -> Self {
        self.tx = tx;
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
