use async_trait::async_trait;
use dashmap::DashMap;
use secrets_core::error::CoreResult;
use uuid::Uuid;

use crate::model::{Client, Token};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert(&self, client: Client) -> CoreResult<()>;
    async fn get_by_id(&self, id: Uuid) -> CoreResult<Option<Client>>;
    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Client>>;
    async fn update(&self, client: Client) -> CoreResult<()>;
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    by_id: DashMap<Uuid, Client>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn insert(&self, client: Client) -> CoreResult<()> {
        self.by_id.insert(client.id, client);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Option<Client>> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Client>> {
        Ok(self
            .by_id
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, client: Client) -> CoreResult<()> {
        self.by_id.insert(client.id, client);
        Ok(())
    }
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert(&self, token: Token) -> CoreResult<()>;
    async fn get_by_hash(&self, token_hash: &str) -> CoreResult<Option<Token>>;
}

#[derive(Default)]
pub struct InMemoryTokenRepository {
    by_hash: DashMap<String, Token>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, token: Token) -> CoreResult<()> {
        self.by_hash.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn get_by_hash(&self, token_hash: &str) -> CoreResult<Option<Token>> {
        Ok(self.by_hash.get(token_hash).map(|entry| entry.value().clone()))
    }
}
