use async_trait::async_trait;
use dashmap::DashMap;
use secrets_core::error::CoreResult;

use crate::model::TransitKey;

/// Storage seam for Transit key versions.
#[async_trait]
pub trait TransitKeyRepository: Send + Sync {
    async fn insert(&self, key: TransitKey) -> CoreResult<()>;
    async fn get_version(&self, name: &str, version: i64) -> CoreResult<Option<TransitKey>>;
    /// The greatest version for `name`, or `None` if the name doesn't exist.
    async fn get_active(&self, name: &str) -> CoreResult<Option<TransitKey>>;
    /// Removes every version of `name`. Outstanding ciphertexts for it
    /// become undecryptable.
    async fn delete_all(&self, name: &str) -> CoreResult<()>;
}

#[derive(Default)]
pub struct InMemoryTransitKeyRepository {
    by_name_version: DashMap<(String, i64), TransitKey>,
}

impl InMemoryTransitKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransitKeyRepository for InMemoryTransitKeyRepository {
    async fn insert(&self, key: TransitKey) -> CoreResult<()> {
        self.by_name_version
            .insert((key.name.clone(), key.version), key);
        Ok(())
    }

    async fn get_version(&self, name: &str, version: i64) -> CoreResult<Option<TransitKey>> {
        Ok(self
            .by_name_version
            .get(&(name.to_string(), version))
            .map(|entry| entry.value().clone()))
    }

    async fn get_active(&self, name: &str) -> CoreResult<Option<TransitKey>> {
        Ok(self
            .by_name_version
            .iter()
            .filter(|entry| entry.key().0 == name)
            .max_by_key(|entry| entry.value().version)
            .map(|entry| entry.value().clone()))
    }

    async fn delete_all(&self, name: &str) -> CoreResult<()> {
        self.by_name_version.retain(|key, _| key.0 != name);
        Ok(())
    }
}
