use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// The two AEAD ciphers a KEK, DEK or data envelope may be tagged with
/// (design spec §4.2/§4.4). Stored as a plain tag alongside ciphertext —
/// never as a trait object, so dispatch stays a match, not a vtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    AesGcm,
    ChaCha20Poly1305,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::AesGcm => "aes-gcm",
            Algorithm::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<Self> {
        match s {
            "aes-gcm" => Ok(Algorithm::AesGcm),
            "chacha20-poly1305" => Ok(Algorithm::ChaCha20Poly1305),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A freshly generated random 12-byte nonce.
fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Seal `plaintext` under `key` with a fresh random nonce and optional
/// associated data, returning `(nonce, ciphertext)`. Ciphertext includes the
/// authentication tag (the `aead` crate appends it).
pub fn seal(
    algorithm: Algorithm,
    key: &[u8; KEY_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> CryptoResult<([u8; NONCE_LEN], Vec<u8>)> {
    let nonce = random_nonce();
    let ciphertext = match algorithm {
        Algorithm::AesGcm => {
            let cipher =
                Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::EncryptionFailed)?;
            cipher
                .encrypt(&nonce.into(), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::EncryptionFailed)?
        }
        Algorithm::ChaCha20Poly1305 => {
            let cipher =
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::EncryptionFailed)?;
            cipher
                .encrypt(&nonce.into(), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::EncryptionFailed)?
        }
    };
    Ok((nonce, ciphertext))
}

/// Seal `plaintext` under `key` with a caller-supplied nonce instead of a
/// fresh random one. Used where the nonce must be derived deterministically
/// (e.g. from a SIV) rather than drawn from the RNG.
pub fn seal_with_nonce(
    algorithm: Algorithm,
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    match algorithm {
        Algorithm::AesGcm => {
            let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::EncryptionFailed)?;
            cipher
                .encrypt(nonce.into(), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::EncryptionFailed)
        }
        Algorithm::ChaCha20Poly1305 => {
            let cipher =
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::EncryptionFailed)?;
            cipher
                .encrypt(nonce.into(), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::EncryptionFailed)
        }
    }
}

/// Open a ciphertext produced by [`seal`]. Returns `Zeroizing` since the
/// recovered plaintext is frequently key material (a wrapped KEK or DEK).
pub fn open(
    algorithm: Algorithm,
    key: &[u8; KEY_LEN],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            got: nonce.len(),
        });
    }
    let plaintext = match algorithm {
        Algorithm::AesGcm => {
            let cipher =
                Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::DecryptionFailed)?;
            cipher
                .decrypt(nonce.into(), Payload { msg: ciphertext, aad })
                .map_err(|_| CryptoError::DecryptionFailed)?
        }
        Algorithm::ChaCha20Poly1305 => {
            let cipher =
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::DecryptionFailed)?;
            cipher
                .decrypt(nonce.into(), Payload { msg: ciphertext, aad })
                .map_err(|_| CryptoError::DecryptionFailed)?
        }
    };
    Ok(Zeroizing::new(plaintext))
}

/// Generate a fresh random 32-byte key (used for KEKs and DEKs alike).
pub fn generate_key() -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    Zeroizing::new(key)
}
