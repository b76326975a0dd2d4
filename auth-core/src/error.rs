use secrets_core::error::{CoreError, ErrorKind};

/// All auth-core failures collapse onto `secrets_core::CoreError`. Missing
/// client and wrong-secret both map to `invalid_credentials` (§4.7: "must
/// map to the same public error ... to prevent enumeration").
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("client is inactive")]
    ClientInactive,
    #[error("client is locked")]
    ClientLocked,
    #[error("token not found, expired, or revoked")]
    InvalidToken,
    #[error("client name already in use")]
    NameConflict,
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => CoreError::new(ErrorKind::InvalidCredentials, err.to_string()),
            AuthError::ClientInactive => CoreError::new(ErrorKind::ClientInactive, err.to_string()),
            AuthError::ClientLocked => CoreError::new(ErrorKind::ClientLocked, err.to_string()),
            AuthError::InvalidToken => CoreError::new(ErrorKind::Unauthorized, err.to_string()),
            AuthError::NameConflict => CoreError::new(ErrorKind::Conflict, err.to_string()),
            AuthError::HashingFailed(_) => CoreError::new(ErrorKind::Internal, err.to_string()),
        }
    }
}
