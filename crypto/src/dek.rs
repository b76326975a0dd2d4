use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrets_core::new_id;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::aead::{self, Algorithm};
use crate::error::{CryptoError, CryptoResult};
use crate::kek::KekChain;

/// `Dek` record (design spec §3). Each Secret version, TransitKey version
/// and TokenizationKey version owns exactly one `Dek` — never shared across
/// resources — stored encrypted under the KEK referenced by `kek_id`.
#[derive(Debug, Clone)]
pub struct Dek {
    pub id: Uuid,
    pub kek_id: Uuid,
    pub algorithm: Algorithm,
    pub encrypted_key: Vec<u8>,
    pub nonce: [u8; aead::NONCE_LEN],
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait DekRepository: Send + Sync {
    async fn insert(&self, dek: Dek) -> CryptoResult<()>;
    async fn get_by_id(&self, id: Uuid) -> CryptoResult<Option<Dek>>;
}

#[derive(Default)]
pub struct InMemoryDekRepository {
    by_id: DashMap<Uuid, Dek>,
}

impl InMemoryDekRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DekRepository for InMemoryDekRepository {
    async fn insert(&self, dek: Dek) -> CryptoResult<()> {
        self.by_id.insert(dek.id, dek);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> CryptoResult<Option<Dek>> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }
}

/// `DekService` — generate a fresh DEK wrapped by the active KEK, or unwrap
/// an existing one for use (design spec §4.3).
pub struct DekService {
    repository: Arc<dyn DekRepository>,
    kek_chain: Arc<KekChain>,
}

impl DekService {
    pub fn new(repository: Arc<dyn DekRepository>, kek_chain: Arc<KekChain>) -> Self {
        Self {
            repository,
            kek_chain,
        }
    }

    /// Random 32 bytes, AEAD-wrap with the active KEK (AAD = dek_id),
    /// persist the record, return the plaintext for immediate in-memory use.
    pub async fn generate(&self, algorithm: Algorithm) -> CryptoResult<(Dek, Zeroizing<[u8; 32]>)> {
        let (active_kek, kek_plain) = self.kek_chain.unwrap_active().await?;
        let id = new_id();
        let plaintext = aead::generate_key();
        let (nonce, encrypted_key) =
            aead::seal(algorithm, &kek_plain, id.as_bytes(), &*plaintext)?;
        let dek = Dek {
            id,
            kek_id: active_kek.id,
            algorithm,
            encrypted_key,
            nonce,
            created_at: Utc::now(),
        };
        self.repository.insert(dek.clone()).await?;
        Ok((dek, plaintext))
    }

    /// Load the record, locate the KEK by `kek_id`, unwrap. Fails with
    /// `IntegrityError` (via [`crate::error::CryptoError::DecryptionFailed`])
    /// if the authentication tag mismatches.
    pub async fn unwrap(&self, dek_id: Uuid) -> CryptoResult<Zeroizing<[u8; 32]>> {
        let dek = self
            .repository
            .get_by_id(dek_id)
            .await?
            .ok_or(CryptoError::DekNotFound(dek_id))?;
        let kek_plain = self.kek_chain.unwrap_by_id(dek.kek_id).await?;
        let plaintext = aead::open(
            dek.algorithm,
            &kek_plain,
            &dek.nonce,
            dek.id.as_bytes(),
            &dek.encrypted_key,
        )?;
        let mut key = [0u8; 32];
        if plaintext.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                got: plaintext.len(),
            });
        }
        key.copy_from_slice(&plaintext);
        Ok(Zeroizing::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kek::InMemoryKekRepository;
    use crate::master_key::MasterKeyChain;
    use base64::{engine::general_purpose::STANDARD, Engine};

    async fn service() -> DekService {
        let material = vec![("default".to_string(), STANDARD.encode([3u8; 32]))];
        let master_keys =
            Arc::new(MasterKeyChain::from_direct_material(&material, "default").unwrap());
        let kek_chain = Arc::new(KekChain::new(
            Arc::new(InMemoryKekRepository::new()),
            master_keys,
        ));
        kek_chain.create_initial(Algorithm::AesGcm).await.unwrap();
        DekService::new(Arc::new(InMemoryDekRepository::new()), kek_chain)
    }

    #[tokio::test]
    async fn generate_then_unwrap_roundtrips() {
        let service = service().await;
        let (dek, plain) = service.generate(Algorithm::AesGcm).await.unwrap();
        let unwrapped = service.unwrap(dek.id).await.unwrap();
        assert_eq!(*plain, *unwrapped);
    }

    #[tokio::test]
    async fn unwrap_missing_dek_not_found() {
        let service = service().await;
        assert!(matches!(
            service.unwrap(Uuid::nil()).await,
            Err(CryptoError::DekNotFound(_))
        ));
    }

    #[tokio::test]
    async fn dek_survives_kek_rotation() {
        let service = service().await;
        let (dek, plain) = service.generate(Algorithm::AesGcm).await.unwrap();
        service.kek_chain.rotate(Algorithm::AesGcm).await.unwrap();
        let unwrapped = service.unwrap(dek.id).await.unwrap();
        assert_eq!(*plain, *unwrapped);
    }
}
