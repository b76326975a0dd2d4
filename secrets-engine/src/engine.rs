use std::sync::Arc;

use chrono::Utc;
use crypto::{Algorithm, DekService};
use secrets_core::error::{CoreError, CoreResult};
use secrets_core::new_id;
use zeroize::Zeroizing;

use crate::model::{normalize_path, Secret, SecretVersion};
use crate::repository::SecretRepository;

/// `secret_id ‖ version` as used for every AEAD call's associated data, so a
/// ciphertext can never be replayed against a different secret or version.
fn aad(secret_id: uuid::Uuid, version: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24);
    buf.extend_from_slice(secret_id.as_bytes());
    buf.extend_from_slice(&version.to_be_bytes());
    buf
}

/// `SecretsEngine` — create-or-update, read and soft-delete over
/// path-addressed secrets (design spec §4.5).
pub struct SecretsEngine {
    repository: Arc<dyn SecretRepository>,
    deks: Arc<DekService>,
}

impl SecretsEngine {
    pub fn new(repository: Arc<dyn SecretRepository>, deks: Arc<DekService>) -> Self {
        Self { repository, deks }
    }

    /// Resolves `secret` by path or creates a new one (`latest_version =
    /// 0`), generates a fresh DEK, AEAD-encrypts under it, and persists the
    /// new version. Writing to a soft-deleted path revives it.
    pub async fn create_or_update(
        &self,
        path: &str,
        plaintext: &[u8],
        algorithm: Algorithm,
    ) -> CoreResult<SecretVersion> {
        let path = normalize_path(path);
        let mut secret = match self.repository.get_by_path(&path).await? {
            Some(existing) => existing,
            None => Secret {
                id: new_id(),
                path: path.clone(),
                latest_version: 0,
                deleted_at: None,
            },
        };

        let (dek, dek_plain) = self.deks.generate(algorithm).await?;
        let version = secret.latest_version + 1;
        let (nonce, ciphertext) =
            crypto::aead::seal(algorithm, &dek_plain, &aad(secret.id, version), plaintext)?;

        let secret_version = SecretVersion {
            secret_id: secret.id,
            version,
            dek_id: dek.id,
            algorithm,
            ciphertext,
            nonce,
            created_at: Utc::now(),
        };

        secret.latest_version = version;
        secret.deleted_at = None;
        self.repository.upsert_secret(secret).await?;
        self.repository.insert_version(secret_version.clone()).await?;
        Ok(secret_version)
    }

    /// Loads the requested (or latest) version, unwraps its DEK,
    /// AEAD-decrypts, and returns the plaintext alongside the version used.
    pub async fn read(&self, path: &str, version: Option<i64>) -> CoreResult<(i64, Zeroizing<Vec<u8>>)> {
        let path = normalize_path(path);
        let secret = self
            .repository
            .get_by_path(&path)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("no secret at path '{path}'")))?;
        if secret.deleted_at.is_some() {
            return Err(CoreError::not_found(format!("no secret at path '{path}'")));
        }
        let version = version.unwrap_or(secret.latest_version);
        let secret_version = self
            .repository
            .get_version(secret.id, version)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("no version {version} at path '{path}'")))?;

        let dek_plain = self.deks.unwrap(secret_version.dek_id).await?;
        let plaintext = crypto::aead::open(
            secret_version.algorithm,
            &dek_plain,
            &secret_version.nonce,
            &aad(secret.id, version),
            &secret_version.ciphertext,
        )?;
        Ok((version, plaintext))
    }

    /// Soft delete: sets `deleted_at`; subsequent reads fail with
    /// `not_found`. Historical ciphertext is retained.
    pub async fn delete(&self, path: &str) -> CoreResult<()> {
        let path = normalize_path(path);
        let mut secret = self
            .repository
            .get_by_path(&path)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("no secret at path '{path}'")))?;
        secret.deleted_at = Some(Utc::now());
        self.repository.upsert_secret(secret).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use crypto::{DekService, InMemoryDekRepository, InMemoryKekRepository, KekChain, MasterKeyChain};

    use super::*;
    use crate::repository::InMemorySecretRepository;

    async fn engine() -> SecretsEngine {
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
        SecretsEngine::new(Arc::new(InMemorySecretRepository::new()), deks)
    }

    /// Scenario (a): envelope write/read.
    #[tokio::test]
    async fn write_then_read_roundtrips_at_version_one() {
        let engine = engine().await;
        let sv = engine
            .create_or_update("app/db", b"p@ss", Algorithm::AesGcm)
            .await
            .unwrap();
        assert_eq!(sv.version, 1);

        let (version, plaintext) = engine.read("app/db", None).await.unwrap();
        assert_eq!(version, 1);
        assert_eq!(&*plaintext, b"p@ss");
    }

    /// Scenario (b): versioning — old versions remain readable by number.
    #[tokio::test]
    async fn second_write_creates_version_two_first_remains_readable() {
        let engine = engine().await;
        engine
            .create_or_update("app/db", b"p@ss", Algorithm::AesGcm)
            .await
            .unwrap();
        let sv2 = engine
            .create_or_update("app/db", b"p@ss-2", Algorithm::AesGcm)
            .await
            .unwrap();
        assert_eq!(sv2.version, 2);

        let (v1, pt1) = engine.read("app/db", Some(1)).await.unwrap();
        assert_eq!(v1, 1);
        assert_eq!(&*pt1, b"p@ss");

        let (v_latest, pt_latest) = engine.read("app/db", None).await.unwrap();
        assert_eq!(v_latest, 2);
        assert_eq!(&*pt_latest, b"p@ss-2");
    }

    #[tokio::test]
    async fn leading_slash_is_normalized_away() {
        let engine = engine().await;
        engine
            .create_or_update("/app/db", b"p@ss", Algorithm::AesGcm)
            .await
            .unwrap();
        assert!(engine.read("app/db", None).await.is_ok());
    }

    #[tokio::test]
    async fn soft_delete_hides_reads_but_keeps_history() {
        let engine = engine().await;
        engine
            .create_or_update("app/db", b"p@ss", Algorithm::AesGcm)
            .await
            .unwrap();
        engine.delete("app/db").await.unwrap();

        let result = engine.read("app/db", None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let engine = engine().await;
        assert!(engine.read("nope", None).await.is_err());
    }
}
