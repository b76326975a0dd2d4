//! Path-addressed secret storage over the envelope-encryption key hierarchy
//! (design spec §4.5): create-or-update issues a new version per write,
//! read walks KEK-version → DEK → AEAD, delete is a soft delete.

pub mod engine;
pub mod model;
pub mod repository;

pub use engine::SecretsEngine;
pub use model::{Secret, SecretVersion};
pub use repository::{InMemorySecretRepository, SecretRepository};
