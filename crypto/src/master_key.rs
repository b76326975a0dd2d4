use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::ZeroizeOnDrop;

use crate::error::{CryptoError, CryptoResult};
use crate::kms::Keeper;

/// A single master key: 32 bytes of plaintext key material, zeroized on
/// drop. In-memory only — never persisted in plaintext (design spec §4.1).
#[derive(ZeroizeOnDrop)]
pub struct MasterKey {
    #[zeroize(skip)]
    id: String,
    key: [u8; 32],
}

impl MasterKey {
    pub fn new(id: impl Into<String>, key: [u8; 32]) -> Self {
        Self {
            id: id.into(),
            key,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// `{ keys: mapping id -> MasterKey, active_id }`, invariant `active_id ∈
/// keys` (design spec §4.1 data model). Loaded once at startup from direct
/// env material or by unwrapping ciphertext through a [`Keeper`].
pub struct MasterKeyChain {
    keys: HashMap<String, MasterKey>,
    active_id: String,
}

impl MasterKeyChain {
    /// Build a chain directly from `id -> base64(32 bytes)` pairs (the
    /// `MASTER_KEYS=id:base64,id:base64` env format).
    pub fn from_direct_material(
        material: &[(String, String)],
        active_id: impl Into<String>,
    ) -> CryptoResult<Self> {
        let mut keys = HashMap::new();
        for (id, b64) in material {
            if keys.contains_key(id) {
                return Err(CryptoError::DuplicateMasterKeyId(id.clone()));
            }
            let bytes = BASE64
                .decode(b64)
                .map_err(|_| CryptoError::KeyDerivationFailed(format!("invalid base64 for master key '{id}'")))?;
            if bytes.len() != 32 {
                return Err(CryptoError::InvalidKeyLength {
                    expected: 32,
                    got: bytes.len(),
                });
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes);
            keys.insert(id.clone(), MasterKey::new(id.clone(), key));
        }
        let active_id = active_id.into();
        if !keys.contains_key(&active_id) {
            return Err(CryptoError::MasterKeyNotFound(active_id));
        }
        Ok(Self { keys, active_id })
    }

    /// Build a chain by unwrapping each entry's ciphertext through an
    /// external [`Keeper`] (AWS KMS / Vault transit, behind feature flags).
    pub async fn from_keeper(
        keeper: &dyn Keeper,
        wrapped: &[(String, Vec<u8>)],
        active_id: impl Into<String>,
    ) -> CryptoResult<Self> {
        let mut keys = HashMap::new();
        for (id, ciphertext) in wrapped {
            if keys.contains_key(id) {
                return Err(CryptoError::DuplicateMasterKeyId(id.clone()));
            }
            let plaintext = keeper.unwrap_key(id, ciphertext).await?;
            if plaintext.len() != 32 {
                return Err(CryptoError::InvalidKeyLength {
                    expected: 32,
                    got: plaintext.len(),
                });
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&plaintext);
            keys.insert(id.clone(), MasterKey::new(id.clone(), key));
        }
        let active_id = active_id.into();
        if !keys.contains_key(&active_id) {
            return Err(CryptoError::MasterKeyNotFound(active_id));
        }
        Ok(Self { keys, active_id })
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> CryptoResult<&MasterKey> {
        self.keys
            .get(&self.active_id)
            .ok_or_else(|| CryptoError::MasterKeyNotFound(self.active_id.clone()))
    }

    pub fn get(&self, id: &str) -> CryptoResult<&MasterKey> {
        self.keys
            .get(id)
            .ok_or_else(|| CryptoError::MasterKeyNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_material_requires_active_present() {
        let material = vec![("default".to_string(), BASE64.encode([0u8; 32]))];
        let chain = MasterKeyChain::from_direct_material(&material, "missing");
        assert!(chain.is_err());
    }

    #[test]
    fn direct_material_loads_active() {
        let material = vec![("default".to_string(), BASE64.encode([7u8; 32]))];
        let chain = MasterKeyChain::from_direct_material(&material, "default").unwrap();
        assert_eq!(chain.active().unwrap().key(), &[7u8; 32]);
    }

    #[test]
    fn rejects_wrong_length_key() {
        let material = vec![("default".to_string(), BASE64.encode(b"too short"))];
        let chain = MasterKeyChain::from_direct_material(&material, "default");
        assert!(chain.is_err());
    }

    #[test]
    fn direct_material_rejects_duplicate_id() {
        let material = vec![
            ("default".to_string(), BASE64.encode([1u8; 32])),
            ("default".to_string(), BASE64.encode([2u8; 32])),
        ];
        let chain = MasterKeyChain::from_direct_material(&material, "default");
        assert!(chain.is_err());
    }
}
