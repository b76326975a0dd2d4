//! Stateless encryption-as-a-service over versioned named keys (design spec
//! §4.8). Encrypt always targets the active version; decrypt honors the
//! version embedded in the ciphertext envelope, so rotating a key never
//! invalidates ciphertext issued under a prior version.

pub mod engine;
pub mod envelope;
pub mod model;
pub mod repository;

pub use engine::TransitEngine;
pub use model::TransitKey;
pub use repository::{InMemoryTransitKeyRepository, TransitKeyRepository};
