use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrets_core::error::CoreResult;
use uuid::Uuid;

use crate::model::AuditLog;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, log: AuditLog) -> CoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> CoreResult<Option<AuditLog>>;
    async fn list_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> CoreResult<Vec<AuditLog>>;
}

#[derive(Default)]
pub struct InMemoryAuditLogRepository {
    by_id: DashMap<Uuid, AuditLog>,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn insert(&self, log: AuditLog) -> CoreResult<()> {
        self.by_id.insert(log.id, log);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Option<AuditLog>> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> CoreResult<Vec<AuditLog>> {
        let mut logs: Vec<AuditLog> = self
            .by_id
            .iter()
            .filter(|entry| entry.value().created_at >= from && entry.value().created_at <= to)
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by_key(|log| log.id);
        Ok(logs)
    }
}
