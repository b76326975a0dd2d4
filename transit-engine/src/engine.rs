use std::sync::Arc;

use chrono::Utc;
use crypto::{Algorithm, DekService};
use secrets_core::error::{CoreError, CoreResult};
use secrets_core::new_id;

use crate::envelope;
use crate::model::TransitKey;
use crate::repository::TransitKeyRepository;

fn aad(name: &str, version: i64) -> Vec<u8> {
    let mut buf = name.as_bytes().to_vec();
    buf.extend_from_slice(&version.to_be_bytes());
    buf
}

/// `TransitEngine` — stateless encrypt/decrypt/rotate/delete over versioned
/// named keys (design spec §4.8). Encrypt always uses the active version;
/// decrypt honors whatever version the envelope names, so rotation never
/// invalidates ciphertext already issued.
pub struct TransitEngine {
    repository: Arc<dyn TransitKeyRepository>,
    deks: Arc<DekService>,
}

impl TransitEngine {
    pub fn new(repository: Arc<dyn TransitKeyRepository>, deks: Arc<DekService>) -> Self {
        Self { repository, deks }
    }

    /// Creates version 1 of a new named key. Fails with `conflict` if the
    /// name already has a version.
    pub async fn create_key(&self, name: &str, algorithm: Algorithm) -> CoreResult<TransitKey> {
        if self.repository.get_active(name).await?.is_some() {
            return Err(CoreError::new(
                secrets_core::ErrorKind::Conflict,
                format!("transit key '{name}' already exists"),
            ));
        }
        self.new_version(name, algorithm, 1).await
    }

    /// New version with a fresh DEK; the new algorithm may differ from
    /// prior versions. Existing ciphertexts remain decryptable.
    pub async fn rotate(&self, name: &str, algorithm: Algorithm) -> CoreResult<TransitKey> {
        let active = self
            .repository
            .get_active(name)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("transit key '{name}' not found")))?;
        self.new_version(name, algorithm, active.version + 1).await
    }

    async fn new_version(&self, name: &str, algorithm: Algorithm, version: i64) -> CoreResult<TransitKey> {
        let (dek, _) = self.deks.generate(algorithm).await?;
        let key = TransitKey {
            id: new_id(),
            name: name.to_string(),
            version,
            algorithm,
            dek_id: dek.id,
            created_at: Utc::now(),
        };
        self.repository.insert(key.clone()).await?;
        Ok(key)
    }

    /// Looks up the active version for `name`, unwraps its DEK, and
    /// AEAD-encrypts with `aad = name ‖ version`.
    pub async fn encrypt(&self, name: &str, plaintext: &[u8]) -> CoreResult<String> {
        let key = self
            .repository
            .get_active(name)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("transit key '{name}' not found")))?;
        let dek_plain = self.deks.unwrap(key.dek_id).await?;
        let (nonce, ciphertext) =
            crypto::aead::seal(key.algorithm, &dek_plain, &aad(name, key.version), plaintext)?;
        Ok(envelope::format(key.version, &nonce, &ciphertext))
    }

    /// Parses the version out of the envelope, loads that version's DEK
    /// (even if it's no longer active), and AEAD-decrypts.
    pub async fn decrypt(&self, name: &str, envelope: &str) -> CoreResult<(i64, Vec<u8>)> {
        let (version, nonce, ciphertext) = crate::envelope::parse(envelope)?;
        let key = self
            .repository
            .get_version(name, version)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("transit key '{name}' version {version} not found"))
            })?;
        let dek_plain = self.deks.unwrap(key.dek_id).await?;
        let plaintext = crypto::aead::open(
            key.algorithm,
            &dek_plain,
            &nonce,
            &aad(name, version),
            &ciphertext,
        )?;
        Ok((version, plaintext.to_vec()))
    }

    /// Removes `name` and all its versions. Outstanding ciphertexts become
    /// permanently undecryptable.
    pub async fn delete(&self, name: &str) -> CoreResult<()> {
        self.repository.delete_all(name).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use crypto::{InMemoryDekRepository, InMemoryKekRepository, KekChain, MasterKeyChain};

    use super::*;
    use crate::repository::InMemoryTransitKeyRepository;

    async fn engine() -> TransitEngine {
        let material = vec![("default".to_string(), STANDARD.encode([0u8; 32]))];
        let master_keys =
            Arc::new(MasterKeyChain::from_direct_material(&material, "default").unwrap());
        let kek_chain = Arc::new(KekChain::new(
            Arc::new(InMemoryKekRepository::new()),
            master_keys,
        ));
        kek_chain.create_initial(Algorithm::AesGcm).await.unwrap();
        let deks = Arc::new(DekService::new(
            Arc::new(InMemoryDekRepository::new()),
            kek_chain,
        ));
        TransitEngine::new(Arc::new(InMemoryTransitKeyRepository::new()), deks)
    }

    /// Scenario (c): rotation backward compatibility.
    #[tokio::test]
    async fn rotation_does_not_invalidate_prior_ciphertext() {
        let engine = engine().await;
        engine.create_key("k", Algorithm::AesGcm).await.unwrap();

        let envelope_x = engine.encrypt("k", b"X").await.unwrap();
        assert!(envelope_x.starts_with("1:"));

        engine.rotate("k", Algorithm::AesGcm).await.unwrap();

        let envelope_y = engine.encrypt("k", b"Y").await.unwrap();
        assert!(envelope_y.starts_with("2:"));

        let (version, plaintext) = engine.decrypt("k", &envelope_x).await.unwrap();
        assert_eq!(version, 1);
        assert_eq!(plaintext, b"X");
    }

    #[tokio::test]
    async fn create_key_twice_conflicts() {
        let engine = engine().await;
        engine.create_key("k", Algorithm::AesGcm).await.unwrap();
        assert!(engine.create_key("k", Algorithm::AesGcm).await.is_err());
    }

    #[tokio::test]
    async fn rotate_unknown_name_not_found() {
        let engine = engine().await;
        assert!(engine.rotate("nope", Algorithm::AesGcm).await.is_err());
    }

    #[tokio::test]
    async fn decrypt_after_delete_fails() {
        let engine = engine().await;
        engine.create_key("k", Algorithm::AesGcm).await.unwrap();
        let envelope = engine.encrypt("k", b"secret").await.unwrap();
        engine.delete("k").await.unwrap();
        assert!(engine.decrypt("k", &envelope).await.is_err());
    }

    #[tokio::test]
    async fn decrypt_rejects_malformed_envelope() {
        let engine = engine().await;
        engine.create_key("k", Algorithm::AesGcm).await.unwrap();
        assert!(engine.decrypt("k", "not-an-envelope").await.is_err());
    }
}
