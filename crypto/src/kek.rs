use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrets_core::new_id;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::aead::{self, Algorithm};
use crate::error::{CryptoError, CryptoResult};
use crate::master_key::MasterKeyChain;

/// `Kek` record (design spec §3 data model). `encrypted_key` is
/// `AEAD(master_key, plaintext=32-byte KEK, nonce, aad=kek.id)`.
#[derive(Debug, Clone)]
pub struct Kek {
    pub id: Uuid,
    pub master_key_id: String,
    pub version: i64,
    pub algorithm: Algorithm,
    pub encrypted_key: Vec<u8>,
    pub nonce: [u8; aead::NONCE_LEN],
    pub created_at: DateTime<Utc>,
}

/// Storage seam for KEK records. The in-memory implementation below is the
/// reference store; a real deployment swaps in a relational one without
/// touching [`KekChain`].
#[async_trait]
pub trait KekRepository: Send + Sync {
    async fn insert(&self, kek: Kek) -> CryptoResult<()>;
    async fn get_by_id(&self, id: Uuid) -> CryptoResult<Option<Kek>>;
    /// The KEK with the greatest version — "active" is defined purely by
    /// version order (design spec §4.2).
    async fn get_active(&self) -> CryptoResult<Option<Kek>>;
    async fn max_version(&self) -> CryptoResult<i64>;
}

/// In-memory `KekRepository`. The `next_version` counter plays the role of
/// the transactional `SELECT max(version) FOR UPDATE` the design spec calls
/// for: a single atomic fetch-and-increment keeps versions gapless and
/// unique without a real transaction manager.
#[derive(Default)]
pub struct InMemoryKekRepository {
    by_id: DashMap<Uuid, Kek>,
    next_version: AtomicI64,
}

impl InMemoryKekRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KekRepository for InMemoryKekRepository {
    async fn insert(&self, kek: Kek) -> CryptoResult<()> {
        self.next_version.fetch_max(kek.version, Ordering::SeqCst);
        self.by_id.insert(kek.id, kek);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CryptoResult<Option<Kek>> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_active(&self) -> CryptoResult<Option<Kek>> {
        Ok(self
            .by_id
            .iter()
            .max_by_key(|entry| entry.value().version)
            .map(|entry| entry.value().clone()))
    }

    async fn max_version(&self) -> CryptoResult<i64> {
        Ok(self.next_version.load(Ordering::SeqCst))
    }
}

/// `KekChain` — create-initial, rotate and unwrap over a [`KekRepository`],
/// wrapping/unwrapping through the active (or a named) master key.
pub struct KekChain {
    repository: Arc<dyn KekRepository>,
    master_keys: Arc<MasterKeyChain>,
}

impl KekChain {
    pub fn new(repository: Arc<dyn KekRepository>, master_keys: Arc<MasterKeyChain>) -> Self {
        Self {
            repository,
            master_keys,
        }
    }

    /// Fails if any KEK already exists. Generates a random 32-byte key,
    /// AEAD-wraps it under the active master key with AAD = the KEK's own
    /// id, and persists it as version 1.
    pub async fn create_initial(&self, algorithm: Algorithm) -> CryptoResult<Kek> {
        if self.repository.get_active().await?.is_some() {
            return Err(CryptoError::KekAlreadyExists);
        }
        self.wrap_and_store(algorithm, 1).await
    }

    /// Creates `version = max(version) + 1` with a fresh random KEK. Never
    /// re-encrypts existing DEKs — prior versions remain usable for
    /// unwrapping, which is what makes rotation O(1).
    pub async fn rotate(&self, algorithm: Algorithm) -> CryptoResult<Kek> {
        let next_version = self.repository.max_version().await? + 1;
        if next_version == 1 {
            return Err(CryptoError::NoActiveKek);
        }
        self.wrap_and_store(algorithm, next_version).await
    }

    async fn wrap_and_store(&self, algorithm: Algorithm, version: i64) -> CryptoResult<Kek> {
        let master_key = self.master_keys.active()?;
        let id = new_id();
        let plaintext = aead::generate_key();
        let (nonce, encrypted_key) =
            aead::seal(algorithm, master_key.key(), id.as_bytes(), &*plaintext)?;
        let kek = Kek {
            id,
            master_key_id: self.master_keys.active_id().to_string(),
            version,
            algorithm,
            encrypted_key,
            nonce,
            created_at: Utc::now(),
        };
        self.repository.insert(kek.clone()).await?;
        Ok(kek)
    }

    /// Locate the active KEK, locate its master key, AEAD-decrypt.
    pub async fn unwrap_active(&self) -> CryptoResult<(Kek, Zeroizing<[u8; 32]>)> {
        let kek = self
            .repository
            .get_active()
            .await?
            .ok_or(CryptoError::NoActiveKek)?;
        let plaintext = self.unwrap_kek(&kek)?;
        Ok((kek, plaintext))
    }

    /// Locate a specific KEK by id, locate its master key, AEAD-decrypt.
    /// Fails with `KekNotFound` if the record is missing, or via the
    /// underlying master-key lookup if `master_key_id` has been retired
    /// without a configuration update (a configuration regression).
    pub async fn unwrap_by_id(&self, id: Uuid) -> CryptoResult<Zeroizing<[u8; 32]>> {
        let kek = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CryptoError::KekNotFound(id))?;
        self.unwrap_kek(&kek)
    }

    fn unwrap_kek(&self, kek: &Kek) -> CryptoResult<Zeroizing<[u8; 32]>> {
        let master_key = self.master_keys.get(&kek.master_key_id)?;
        let plaintext = aead::open(
            kek.algorithm,
            master_key.key(),
            &kek.nonce,
            kek.id.as_bytes(),
            &kek.encrypted_key,
        )?;
        if plaintext.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                got: plaintext.len(),
            });
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&plaintext);
        Ok(Zeroizing::new(key))
    }
}
