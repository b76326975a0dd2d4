//! `tracing` initialization plus redaction of secret material (bearer
//! tokens, key bytes, wire envelopes, hash fields) before it reaches a log
//! sink. Use the `redacted_*!` macros instead of `tracing::*!` anywhere a
//! format argument might carry a DEK, KEK, or bearer token.

pub mod config;
pub mod macros;
pub mod redactor;
pub mod tracing_init;

pub use config::LoggerConfig;
pub use redactor::SecretRedactor;
pub use tracing_init::init_tracing;
