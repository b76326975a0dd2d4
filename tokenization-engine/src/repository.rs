use async_trait::async_trait;
use dashmap::DashMap;
use secrets_core::error::CoreResult;
use uuid::Uuid;

use crate::model::{TokenizationKey, TokenizedValue};

#[async_trait]
pub trait TokenizationKeyRepository: Send + Sync {
    async fn insert(&self, key: TokenizationKey) -> CoreResult<()>;
    async fn get_active(&self, name: &str) -> CoreResult<Option<TokenizationKey>>;
    async fn get_version(&self, name: &str, version: i64) -> CoreResult<Option<TokenizationKey>>;
}

#[derive(Default)]
pub struct InMemoryTokenizationKeyRepository {
    by_name_version: DashMap<(String, i64), TokenizationKey>,
}

impl InMemoryTokenizationKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenizationKeyRepository for InMemoryTokenizationKeyRepository {
    async fn insert(&self, key: TokenizationKey) -> CoreResult<()> {
        self.by_name_version
            .insert((key.name.clone(), key.version), key);
        Ok(())
    }

    async fn get_active(&self, name: &str) -> CoreResult<Option<TokenizationKey>> {
        Ok(self
            .by_name_version
            .iter()
            .filter(|entry| entry.key().0 == name)
            .max_by_key(|entry| entry.value().version)
            .map(|entry| entry.value().clone()))
    }

    async fn get_version(&self, name: &str, version: i64) -> CoreResult<Option<TokenizationKey>> {
        Ok(self
            .by_name_version
            .get(&(name.to_string(), version))
            .map(|entry| entry.value().clone()))
    }
}

#[async_trait]
pub trait TokenizedValueRepository: Send + Sync {
    async fn insert(&self, value: TokenizedValue) -> CoreResult<()>;
    async fn get_by_token(&self, token: &str) -> CoreResult<Option<TokenizedValue>>;
    async fn get_by_siv(&self, key_id: Uuid, siv: [u8; 32]) -> CoreResult<Option<TokenizedValue>>;
    async fn revoke(&self, token: &str) -> CoreResult<()>;
}

#[derive(Default)]
pub struct InMemoryTokenizedValueRepository {
    by_token: DashMap<String, TokenizedValue>,
    by_siv: DashMap<(Uuid, [u8; 32]), String>,
}

impl InMemoryTokenizedValueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenizedValueRepository for InMemoryTokenizedValueRepository {
    async fn insert(&self, value: TokenizedValue) -> CoreResult<()> {
        if let Some(siv) = value.siv {
            self.by_siv
                .insert((value.tokenization_key_id, siv), value.token.clone());
        }
        self.by_token.insert(value.token.clone(), value);
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> CoreResult<Option<TokenizedValue>> {
        Ok(self.by_token.get(token).map(|entry| entry.value().clone()))
    }

    async fn get_by_siv(&self, key_id: Uuid, siv: [u8; 32]) -> CoreResult<Option<TokenizedValue>> {
        let Some(token) = self.by_siv.get(&(key_id, siv)).map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };
        self.get_by_token(&token).await
    }

    async fn revoke(&self, token: &str) -> CoreResult<()> {
        if let Some(mut entry) = self.by_token.get_mut(token) {
            entry.revoked_at = Some(chrono::Utc::now());
        }
        Ok(())
    }
}
