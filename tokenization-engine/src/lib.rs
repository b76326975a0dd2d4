//! Format-preserving and deterministic tokenization over versioned named
//! keys, sharing one rejection-sampling implementation between deterministic
//! and random token issuance (design spec §4.9).

pub mod engine;
pub mod format;
pub mod model;
pub mod repository;

pub use engine::TokenizationEngine;
pub use model::{TokenFormat, TokenizationKey, TokenizedValue};
pub use repository::{
    InMemoryTokenizationKeyRepository, InMemoryTokenizedValueRepository,
    TokenizationKeyRepository, TokenizedValueRepository,
};
