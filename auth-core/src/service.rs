use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use secrets_core::error::CoreResult;
use secrets_core::new_id;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::model::{Client, PolicyDoc, Token};
use crate::repository::{ClientRepository, TokenRepository};

const TOKEN_BYTES: usize = 32;

fn hash_token(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

/// Generates a random client secret or bearer token: `TOKEN_BYTES` random
/// bytes, hex-encoded.
fn generate_random_secret() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `AuthService` — client lifecycle, bearer-token issuance/validation, and
/// lockout bookkeeping (design spec §4.7).
pub struct AuthService {
    clients: Arc<dyn ClientRepository>,
    tokens: Arc<dyn TokenRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        tokens: Arc<dyn TokenRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            clients,
            tokens,
            config,
        }
    }

    /// Creates a client with a fresh random secret. Persists only its
    /// Argon2id hash; returns the plaintext secret once.
    pub async fn create_client(
        &self,
        name: &str,
        policies: Vec<PolicyDoc>,
    ) -> CoreResult<(Client, String)> {
        if self.clients.get_by_name(name).await?.is_some() {
            return Err(AuthError::NameConflict.into());
        }

        let plain_secret = generate_random_secret();
        let secret_hash = crypto::kdf::Kdf::argon2_hash(plain_secret.as_bytes(), &self.config.argon2_params)
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?;

        let client = Client {
            id: new_id(),
            name: name.to_string(),
            secret_hash,
            is_active: true,
            policies,
            failed_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
        };
        self.clients.insert(client.clone()).await?;
        Ok((client, plain_secret))
    }

    /// 1. load client, 2. reject if inactive or locked, 3. constant-time
    /// compare (via argon2's own constant-time verify) with lockout
    /// bookkeeping on mismatch, 4. issue a fresh bearer token.
    pub async fn issue_token(&self, client_id: Uuid, plain_secret: &str) -> CoreResult<String> {
        let mut client = self
            .clients
            .get_by_id(client_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !client.is_active {
            return Err(AuthError::ClientInactive.into());
        }
        if client.locked_until.is_some_and(|until| until > Utc::now()) {
            return Err(AuthError::ClientLocked.into());
        }

        let matches = crypto::kdf::Kdf::argon2_verify(plain_secret.as_bytes(), &client.secret_hash)
            .map_err(|e| AuthError::HashingFailed(e.to_string()))?;

        if !matches {
            client.failed_attempts += 1;
            if client.failed_attempts >= self.config.max_attempts {
                client.locked_until = Some(Utc::now() + Duration::minutes(self.config.lockout_duration_minutes));
                client.failed_attempts = 0;
            }
            self.clients.update(client).await?;
            return Err(AuthError::InvalidCredentials.into());
        }

        client.failed_attempts = 0;
        client.locked_until = None;
        self.clients.update(client.clone()).await?;

        let plain_token = generate_random_secret();
        let token = Token {
            id: new_id(),
            token_hash: hash_token(&plain_token),
            client_id: client.id,
            expires_at: Utc::now() + Duration::hours(self.config.token_ttl_hours),
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.tokens.insert(token).await?;
        Ok(plain_token)
    }

    /// Hash lookup; reject if not found, expired, or revoked; otherwise
    /// return the owning client id.
    pub async fn validate_bearer(&self, plain_token: &str) -> CoreResult<Uuid> {
        let token = self
            .tokens
            .get_by_hash(&hash_token(plain_token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if token.revoked_at.is_some() || token.expires_at < Utc::now() {
            return Err(AuthError::InvalidToken.into());
        }
        Ok(token.client_id)
    }

    /// Admin operation: clears the failed-attempt counter and lock
    /// timestamp regardless of current state.
    pub async fn unlock_client(&self, client_id: Uuid) -> CoreResult<()> {
        let mut client = self
            .clients
            .get_by_id(client_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        client.failed_attempts = 0;
        client.locked_until = None;
        self.clients.update(client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Capability;
    use crate::repository::{InMemoryClientRepository, InMemoryTokenRepository};

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryClientRepository::new()),
            Arc::new(InMemoryTokenRepository::new()),
            AuthConfig {
                max_attempts: 3,
                lockout_duration_minutes: 30,
                token_ttl_hours: 24,
                argon2_params: crypto::kdf::Argon2Params {
                    memory_cost: 8,
                    time_cost: 1,
                    parallelism: 1,
                },
            },
        )
    }

    #[tokio::test]
    async fn issue_token_roundtrips() {
        let service = service();
        let (client, secret) = service
            .create_client("svc-a", vec![PolicyDoc::new("*", [Capability::Read])])
            .await
            .unwrap();
        let token = service.issue_token(client.id, &secret).await.unwrap();
        let resolved = service.validate_bearer(&token).await.unwrap();
        assert_eq!(resolved, client.id);
    }

    #[tokio::test]
    async fn wrong_secret_increments_failed_attempts() {
        let service = service();
        let (client, _) = service.create_client("svc-b", vec![]).await.unwrap();
        assert!(service.issue_token(client.id, "wrong").await.is_err());
        let stored = service.clients.get_by_id(client.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 1);
    }

    #[tokio::test]
    async fn lockout_after_max_attempts() {
        let service = service();
        let (client, _) = service.create_client("svc-c", vec![]).await.unwrap();

        for _ in 0..3 {
            let _ = service.issue_token(client.id, "wrong").await;
        }

        let locked = service.clients.get_by_id(client.id).await.unwrap().unwrap();
        assert!(locked.locked_until.is_some());
        assert_eq!(locked.failed_attempts, 0);

        let err = service.issue_token(client.id, "still-wrong").await.unwrap_err();
        assert_eq!(err.kind(), secrets_core::ErrorKind::ClientLocked);
    }

    #[tokio::test]
    async fn unlock_clears_lockout() {
        let service = service();
        let (client, _) = service.create_client("svc-d", vec![]).await.unwrap();
        for _ in 0..3 {
            let _ = service.issue_token(client.id, "wrong").await;
        }
        service.unlock_client(client.id).await.unwrap();
        let unlocked = service.clients.get_by_id(client.id).await.unwrap().unwrap();
        assert!(unlocked.locked_until.is_none());
        assert_eq!(unlocked.failed_attempts, 0);
    }

    #[tokio::test]
    async fn missing_client_and_wrong_secret_share_error_kind() {
        let service = service();
        let (client, _) = service.create_client("svc-e", vec![]).await.unwrap();

        let missing_err = service.issue_token(Uuid::nil(), "whatever").await.unwrap_err();
        let wrong_err = service.issue_token(client.id, "wrong").await.unwrap_err();

        assert_eq!(missing_err.kind(), secrets_core::ErrorKind::InvalidCredentials);
        assert_eq!(wrong_err.kind(), secrets_core::ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn inactive_client_rejected() {
        let service = service();
        let (mut client, secret) = service.create_client("svc-f", vec![]).await.unwrap();
        client.is_active = false;
        service.clients.update(client.clone()).await.unwrap();

        let err = service.issue_token(client.id, &secret).await.unwrap_err();
        assert_eq!(err.kind(), secrets_core::ErrorKind::ClientInactive);
    }

    #[tokio::test]
    async fn unknown_bearer_token_is_unauthorized_not_invalid_credentials() {
        let service = service();
        let err = service.validate_bearer("not-a-real-token").await.unwrap_err();
        assert_eq!(err.kind(), secrets_core::ErrorKind::Unauthorized);
    }
}
