//! Envelope-encryption key hierarchy: Master Keys → KEKs → DEKs, plus the
//! AEAD engine and constant-time primitives every other engine crate builds
//! on (design spec §4.1–§4.4).
//!
//! - [`master_key`] — loads the chain of master keys, either from direct
//!   env-supplied material or by unwrapping through an external [`kms`]
//!   [`Keeper`](kms::Keeper).
//! - [`kek`] — versioned Key Encryption Keys, exactly one active, wrapped by
//!   a master key.
//! - [`dek`] — per-resource Data Encryption Keys, wrapped by the active KEK.
//! - [`aead`] — the AES-256-GCM / ChaCha20-Poly1305 seal/open primitives
//!   every layer above composes.
//! - [`kdf`] — Argon2id, PBKDF2, HKDF and HMAC-SHA-256 derivation helpers.
//! - [`constant_time`] — timing-safe comparisons for secret material.
//! - [`memory_security`] — an owning, zeroize-on-drop handle for plaintext
//!   key material.

pub mod aead;
pub mod constant_time;
pub mod dek;
pub mod error;
pub mod kdf;
pub mod kek;
pub mod kms;
pub mod master_key;
pub mod memory_security;

pub use aead::Algorithm;
pub use dek::{Dek, DekRepository, DekService, InMemoryDekRepository};
pub use error::{CryptoError, CryptoResult};
pub use kek::{InMemoryKekRepository, Kek, KekChain, KekRepository};
pub use master_key::{MasterKey, MasterKeyChain};
pub use memory_security::SecureBytes;
