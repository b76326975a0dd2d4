use crypto::kdf::Argon2Params;

/// Tunables for client-secret hashing, lockout, and bearer-token TTL (§4.7).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub max_attempts: u32,
    pub lockout_duration_minutes: i64,
    pub token_ttl_hours: i64,
    pub argon2_params: Argon2Params,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_duration_minutes: 30,
            token_ttl_hours: 24,
            argon2_params: Argon2Params::default(),
        }
    }
}
