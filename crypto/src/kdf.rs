use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Params {
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self { iterations: 600_000 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// Key derivation helpers used for password-class secrets (Argon2id, per
/// §4.7's client-secret hashing), bearer-token material (HKDF/PBKDF2), and
/// the audit log's HMAC signing key.
pub struct Kdf;

impl Kdf {
    pub fn generate_salt(length: usize) -> Vec<u8> {
        let mut salt = vec![0u8; length];
        rand::thread_rng().fill_bytes(&mut salt);
        salt
    }

    pub fn pbkdf2(
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_length: usize,
    ) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(vec![0u8; key_length]);
        pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
        out
    }

    /// Hash a password using Argon2id, returning the PHC string (algorithm,
    /// params, salt and hash all embedded — the format stored for a
    /// client's secret hash).
    pub fn argon2_hash(password: &[u8], params: &Argon2Params) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(params.memory_cost, params.time_cost, params.parallelism, None)
                .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?,
        );
        let hash = argon2
            .hash_password(password, &salt)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify in constant time (argon2's own comparison is constant-time).
    pub fn argon2_verify(password: &[u8], password_hash: &str) -> CryptoResult<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        Ok(Argon2::default().verify_password(password, &parsed).is_ok())
    }

    /// HKDF-Expand (RFC 5869) for deriving context-bound keys from a single
    /// piece of input key material.
    pub fn hkdf(ikm: &[u8], salt: &[u8], info: &[u8], length: usize) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = Zeroizing::new(vec![0u8; length]);
        hk.expand(info, &mut okm)
            .map_err(|_| CryptoError::KeyDerivationFailed("HKDF expand failed".to_string()))?;
        Ok(okm)
    }

    /// `HMAC-SHA-256(key, message)`. Used for the audit log's signing key
    /// derivation (`HMAC-SHA256(kek_plain, "audit-log-hmac-v1")`) and for
    /// tokenization's deterministic SIV-style nonce derivation.
    pub fn hmac_sha256(key: &[u8], message: &[u8]) -> CryptoResult<[u8; 32]> {
        let mut mac = Hmac::<Sha256>::new_from_slice(key)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
        mac.update(message);
        let result = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbkdf2_is_deterministic_for_same_inputs() {
        let salt = Kdf::generate_salt(16);
        let a = Kdf::pbkdf2(b"password", &salt, 10_000, 32);
        let b = Kdf::pbkdf2(b"password", &salt, 10_000, 32);
        assert_eq!(*a, *b);
    }

    #[test]
    fn argon2_hash_and_verify() {
        let params = Argon2Params::default();
        let hash = Kdf::argon2_hash(b"correct horse", &params).unwrap();
        assert!(Kdf::argon2_verify(b"correct horse", &hash).unwrap());
        assert!(!Kdf::argon2_verify(b"wrong", &hash).unwrap());
    }

    #[test]
    fn hkdf_different_info_yields_different_keys() {
        let ikm = b"master secret";
        let a = Kdf::hkdf(ikm, b"salt", b"context-a", 32).unwrap();
        let b = Kdf::hkdf(ikm, b"salt", b"context-b", 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn hmac_sha256_is_deterministic() {
        let a = Kdf::hmac_sha256(b"key", b"message").unwrap();
        let b = Kdf::hmac_sha256(b"key", b"message").unwrap();
        assert_eq!(a, b);
        let c = Kdf::hmac_sha256(b"key", b"different").unwrap();
        assert_ne!(a, c);
    }
}
