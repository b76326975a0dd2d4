use async_trait::async_trait;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client as KmsClient;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::kms::Keeper;

/// Wraps/unwraps master-key material through an AWS KMS customer master
/// key, using the symmetric `Encrypt`/`Decrypt` operations directly (not
/// `GenerateDataKey` — this workspace generates its own master-key material
/// locally and asks KMS only to wrap/unwrap it).
pub struct AwsKmsKeeper {
    client: KmsClient,
}

impl AwsKmsKeeper {
    pub fn new(client: KmsClient) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(KmsClient::new(&config))
    }
}

#[async_trait]
impl Keeper for AwsKmsKeeper {
    async fn wrap_key(&self, key_id: &str, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let response = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext.to_vec()))
            .send()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?;
        response
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| CryptoError::KeeperError("AWS KMS returned no ciphertext".to_string()))
    }

    async fn unwrap_key(&self, key_id: &str, ciphertext: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let response = self
            .client
            .decrypt()
            .key_id(key_id)
            .ciphertext_blob(Blob::new(ciphertext.to_vec()))
            .send()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?;
        response
            .plaintext()
            .map(|blob| Zeroizing::new(blob.as_ref().to_vec()))
            .ok_or_else(|| CryptoError::KeeperError("AWS KMS returned no plaintext".to_string()))
    }
}
