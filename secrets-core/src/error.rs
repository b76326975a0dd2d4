use std::fmt;

use thiserror::Error;

/// Cross-cutting error taxonomy (design spec §7). Every engine crate wraps
/// its own `thiserror` enum in a `CoreError` via `From`, so a future
/// transport layer has exactly one place to map a kind onto an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidCredentials,
    ClientInactive,
    ClientLocked,
    Unauthorized,
    Forbidden,
    InvalidInput,
    IntegrityError,
    SignatureMissing,
    SignatureInvalid,
    Configuration,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::ClientInactive => "client_inactive",
            ErrorKind::ClientLocked => "client_locked",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::IntegrityError => "integrity_error",
            ErrorKind::SignatureMissing => "signature_missing",
            ErrorKind::SignatureInvalid => "signature_invalid",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// The error type every engine service method returns, wrapping a domain
/// error enum behind a stable `kind()` plus a sanitized message. The
/// `message` field must never contain plaintext secret material — callers
/// constructing a `CoreError` from a decrypt failure pass a fixed string,
/// never the ciphertext or key.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct CoreError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(kind: ErrorKind, message: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
