use secrets_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Error taxonomy for the envelope-encryption hierarchy (master key → KEK →
/// DEK) and the AEAD engine beneath it. Never carries plaintext or key
/// material in a variant — only shapes, lengths and identifiers.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid nonce length: expected {expected}, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("master key '{0}' not found in chain")]
    MasterKeyNotFound(String),

    #[error("duplicate master key id '{0}'")]
    DuplicateMasterKeyId(String),

    #[error("no active master key configured")]
    NoActiveMasterKey,

    #[error("KEK {0} not found")]
    KekNotFound(uuid::Uuid),

    #[error("a KEK already exists; use rotate instead of create-initial")]
    KekAlreadyExists,

    #[error("no active KEK: call create-initial before any other operation")]
    NoActiveKek,

    #[error("DEK {0} not found")]
    DekNotFound(uuid::Uuid),

    #[error("unsupported AEAD algorithm tag: {0}")]
    UnsupportedAlgorithm(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("keeper operation failed: {0}")]
    KeeperError(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<CryptoError> for CoreError {
    fn from(err: CryptoError) -> Self {
        match &err {
            CryptoError::DecryptionFailed => {
                CoreError::with_source(ErrorKind::IntegrityError, "integrity_error", err.into())
            }
            CryptoError::MasterKeyNotFound(_)
            | CryptoError::NoActiveMasterKey
            | CryptoError::DuplicateMasterKeyId(_) => {
                CoreError::with_source(ErrorKind::Configuration, "configuration", err.into())
            }
            CryptoError::KekNotFound(_) | CryptoError::DekNotFound(_) => {
                CoreError::with_source(ErrorKind::NotFound, "not_found", err.into())
            }
            CryptoError::KekAlreadyExists => {
                CoreError::with_source(ErrorKind::Conflict, "conflict", err.into())
            }
            _ => CoreError::with_source(ErrorKind::Internal, "internal", err.into()),
        }
    }
}
