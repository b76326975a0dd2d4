use async_trait::async_trait;
use dashmap::DashMap;
use secrets_core::error::CoreResult;
use uuid::Uuid;

use crate::model::{Secret, SecretVersion};

/// Storage seam for the Secrets engine. The in-memory implementation below
/// stands in for a relational store (out of scope for this workspace);
/// `create_or_update` and `read_latest` being "atomic in a single
/// transaction" (design spec §4.5) is upheld here by `DashMap`'s per-shard
/// locking rather than a real transaction manager.
#[async_trait]
pub trait SecretRepository: Send + Sync {
    async fn get_by_path(&self, path: &str) -> CoreResult<Option<Secret>>;
    async fn upsert_secret(&self, secret: Secret) -> CoreResult<()>;
    async fn insert_version(&self, version: SecretVersion) -> CoreResult<()>;
    async fn get_version(&self, secret_id: Uuid, version: i64) -> CoreResult<Option<SecretVersion>>;
}

#[derive(Default)]
pub struct InMemorySecretRepository {
    by_path: DashMap<String, Secret>,
    versions: DashMap<(Uuid, i64), SecretVersion>,
}

impl InMemorySecretRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretRepository for InMemorySecretRepository {
    async fn get_by_path(&self, path: &str) -> CoreResult<Option<Secret>> {
        Ok(self.by_path.get(path).map(|entry| entry.value().clone()))
    }

    async fn upsert_secret(&self, secret: Secret) -> CoreResult<()> {
        self.by_path.insert(secret.path.clone(), secret);
        Ok(())
    }

    async fn insert_version(&self, version: SecretVersion) -> CoreResult<()> {
        self.versions
            .insert((version.secret_id, version.version), version);
        Ok(())
    }

    async fn get_version(&self, secret_id: Uuid, version: i64) -> CoreResult<Option<SecretVersion>> {
        Ok(self
            .versions
            .get(&(secret_id, version))
            .map(|entry| entry.value().clone()))
    }
}
