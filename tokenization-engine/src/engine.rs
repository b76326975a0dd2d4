use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crypto::{Algorithm, DekService};
use rand::RngCore;
use secrets_core::error::{CoreError, CoreResult};
use secrets_core::new_id;

use crate::format::{render_token, SeededStream};
use crate::model::{TokenFormat, TokenizationKey, TokenizedValue};
use crate::repository::{TokenizationKeyRepository, TokenizedValueRepository};

const MAX_COLLISION_RETRIES: usize = 5;

fn aad(name: &str, version: i64) -> Vec<u8> {
    let mut buf = name.as_bytes().to_vec();
    buf.extend_from_slice(&version.to_be_bytes());
    buf
}

/// `TokenizationEngine` — tokenize/detokenize/validate/revoke/rotate over
/// versioned named keys with deterministic or random token issuance
/// (design spec §4.9).
pub struct TokenizationEngine {
    keys: Arc<dyn TokenizationKeyRepository>,
    values: Arc<dyn TokenizedValueRepository>,
    deks: Arc<DekService>,
}

impl TokenizationEngine {
    pub fn new(
        keys: Arc<dyn TokenizationKeyRepository>,
        values: Arc<dyn TokenizedValueRepository>,
        deks: Arc<DekService>,
    ) -> Self {
        Self { keys, values, deks }
    }

    pub async fn create_key(
        &self,
        name: &str,
        format: TokenFormat,
        is_deterministic: bool,
        algorithm: Algorithm,
    ) -> CoreResult<TokenizationKey> {
        if self.keys.get_active(name).await?.is_some() {
            return Err(CoreError::new(
                secrets_core::ErrorKind::Conflict,
                format!("tokenization key '{name}' already exists"),
            ));
        }
        self.new_version(name, format, is_deterministic, algorithm, 1).await
    }

    /// Creates a new key record with the same `name`, `version + 1`, and a
    /// fresh DEK. Tokens minted under old versions continue to detokenize;
    /// determinism semantics apply per version independently.
    pub async fn rotate(
        &self,
        name: &str,
        format: TokenFormat,
        is_deterministic: bool,
        algorithm: Algorithm,
    ) -> CoreResult<TokenizationKey> {
        let active = self
            .keys
            .get_active(name)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("tokenization key '{name}' not found")))?;
        self.new_version(name, format, is_deterministic, algorithm, active.version + 1)
            .await
    }

    async fn new_version(
        &self,
        name: &str,
        format: TokenFormat,
        is_deterministic: bool,
        algorithm: Algorithm,
        version: i64,
    ) -> CoreResult<TokenizationKey> {
        let (dek, _) = self.deks.generate(algorithm).await?;
        let key = TokenizationKey {
            id: new_id(),
            name: name.to_string(),
            version,
            format,
            is_deterministic,
            algorithm,
            dek_id: dek.id,
            created_at: Utc::now(),
        };
        self.keys.insert(key.clone()).await?;
        Ok(key)
    }

    pub async fn tokenize(
        &self,
        name: &str,
        plaintext: &[u8],
        metadata: HashMap<String, String>,
        ttl: Option<Duration>,
    ) -> CoreResult<TokenizedValue> {
        let key = self
            .keys
            .get_active(name)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("tokenization key '{name}' not found")))?;
        let dek_plain = self.deks.unwrap(key.dek_id).await?;

        if key.is_deterministic {
            let mut siv_input = plaintext.to_vec();
            siv_input.extend_from_slice(name.as_bytes());
            let siv = crypto::kdf::Kdf::hmac_sha256(&dek_plain, &siv_input)?;

            if let Some(existing) = self.values.get_by_siv(key.id, siv).await? {
                return Ok(existing);
            }

            let (nonce_bytes, _) = siv.split_at(crypto::aead::NONCE_LEN);
            let mut nonce = [0u8; crypto::aead::NONCE_LEN];
            nonce.copy_from_slice(nonce_bytes);
            let ciphertext = crypto::aead::seal_with_nonce(
                key.algorithm,
                &dek_plain,
                &nonce,
                &aad(name, key.version),
                plaintext,
            )?;

            let mut stream = SeededStream::new(siv);
            let token = render_token(key.format, &mut stream)?;

            let value = TokenizedValue {
                token,
                tokenization_key_id: key.id,
                tokenization_key_name: name.to_string(),
                tokenization_key_version: key.version,
                ciphertext,
                nonce,
                metadata,
                siv: Some(siv),
                expires_at: ttl.and_then(|d| {
                    chrono::Duration::from_std(d).ok().map(|d| Utc::now() + d)
                }),
                revoked_at: None,
                created_at: Utc::now(),
            };
            self.values.insert(value.clone()).await?;
            return Ok(value);
        }

        for _ in 0..MAX_COLLISION_RETRIES {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut seed);

            let mut stream = SeededStream::new(seed);
            let token = render_token(key.format, &mut stream)?;

            if self.values.get_by_token(&token).await?.is_some() {
                continue;
            }

            let (nonce, ciphertext) =
                crypto::aead::seal(key.algorithm, &dek_plain, &aad(name, key.version), plaintext)?;

            let value = TokenizedValue {
                token,
                tokenization_key_id: key.id,
                tokenization_key_name: name.to_string(),
                tokenization_key_version: key.version,
                ciphertext,
                nonce,
                metadata,
                siv: None,
                expires_at: ttl.and_then(|d| {
                    chrono::Duration::from_std(d).ok().map(|d| Utc::now() + d)
                }),
                revoked_at: None,
                created_at: Utc::now(),
            };
            self.values.insert(value.clone()).await?;
            return Ok(value);
        }
        Err(CoreError::internal("exhausted token collision retries"))
    }

    /// Looks up the token; rejects if absent, revoked, or expired; unwraps
    /// its DEK; AEAD-decrypts; returns plaintext and metadata.
    pub async fn detokenize(&self, token: &str) -> CoreResult<(Vec<u8>, HashMap<String, String>)> {
        let value = self
            .values
            .get_by_token(token)
            .await?
            .ok_or_else(|| CoreError::not_found("token not found"))?;
        self.ensure_usable(&value)?;

        let key = self
            .keys
            .get_version(&value.tokenization_key_name, value.tokenization_key_version)
            .await?
            .ok_or_else(|| CoreError::internal("tokenization key record missing"))?;
        let dek_plain = self.deks.unwrap(key.dek_id).await?;
        let plaintext = crypto::aead::open(
            key.algorithm,
            &dek_plain,
            &value.nonce,
            &aad(&value.tokenization_key_name, value.tokenization_key_version),
            &value.ciphertext,
        )?;
        Ok((plaintext.to_vec(), value.metadata))
    }

    /// `true` iff present, not revoked, and (no expiry OR expiry in the
    /// future).
    pub async fn validate(&self, token: &str) -> CoreResult<bool> {
        let Some(value) = self.values.get_by_token(token).await? else {
            return Ok(false);
        };
        Ok(self.ensure_usable(&value).is_ok())
    }

    /// Idempotent: sets `revoked_at = now` if not already set.
    pub async fn revoke(&self, token: &str) -> CoreResult<()> {
        self.values.revoke(token).await
    }

    fn ensure_usable(&self, value: &TokenizedValue) -> CoreResult<()> {
        if value.revoked_at.is_some() {
            return Err(CoreError::not_found("token has been revoked"));
        }
        if let Some(expires_at) = value.expires_at {
            if Utc::now() > expires_at {
                return Err(CoreError::not_found("token has expired"));
            }
        }
        Ok(())
    }
}
