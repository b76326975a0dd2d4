use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::kms::Keeper;

/// Wraps/unwraps master-key material through HashiCorp Vault's Transit
/// secrets engine (`encrypt`/`decrypt` endpoints). `key_id` is the Transit
/// key name.
pub struct VaultKmsKeeper {
    client: reqwest::Client,
    vault_addr: String,
    vault_token: String,
    mount_path: String,
}

#[derive(Deserialize)]
struct VaultResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct EncryptData {
    ciphertext: String,
}

#[derive(Deserialize)]
struct DecryptData {
    plaintext: String,
}

impl VaultKmsKeeper {
    pub fn new(vault_addr: impl Into<String>, vault_token: impl Into<String>, mount_path: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            vault_addr: vault_addr.into().trim_end_matches('/').to_string(),
            vault_token: vault_token.into(),
            mount_path: mount_path.unwrap_or_else(|| "transit".to_string()),
        }
    }

    fn url(&self, key_id: &str, operation: &str) -> String {
        format!(
            "{}/v1/{}/{}/{}",
            self.vault_addr, self.mount_path, operation, key_id
        )
    }
}

#[async_trait]
impl Keeper for VaultKmsKeeper {
    async fn wrap_key(&self, key_id: &str, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let body = json!({ "plaintext": BASE64.encode(plaintext) });
        let response: VaultResponse<EncryptData> = self
            .client
            .post(self.url(key_id, "encrypt"))
            .header("X-Vault-Token", &self.vault_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?
            .json()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?;
        Ok(response.data.ciphertext.into_bytes())
    }

    async fn unwrap_key(&self, key_id: &str, ciphertext: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let ciphertext = String::from_utf8(ciphertext.to_vec())
            .map_err(|_| CryptoError::KeeperError("ciphertext is not valid UTF-8".to_string()))?;
        let body = json!({ "ciphertext": ciphertext });
        let response: VaultResponse<DecryptData> = self
            .client
            .post(self.url(key_id, "decrypt"))
            .header("X-Vault-Token", &self.vault_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?
            .json()
            .await
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?;
        let plaintext = BASE64
            .decode(response.data.plaintext)
            .map_err(|e| CryptoError::KeeperError(e.to_string()))?;
        Ok(Zeroizing::new(plaintext))
    }
}
