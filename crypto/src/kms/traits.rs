use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::CryptoResult;

/// Pluggable external key-wrapping service for master-key material (design
/// spec §4.1: "optionally, master keys are themselves wrapped by an
/// external KMS keeper"). `key_id` is the keeper's own identifier for the
/// wrapping key (an AWS KMS key ARN, a Vault transit key name) — distinct
/// from this workspace's `MasterKey::id`.
#[async_trait]
pub trait Keeper: Send + Sync {
    async fn wrap_key(&self, key_id: &str, plaintext: &[u8]) -> CryptoResult<Vec<u8>>;
    async fn unwrap_key(&self, key_id: &str, ciphertext: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>>;
}
