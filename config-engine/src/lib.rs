//! Environment-sourced startup configuration.
//!
//! Loads an optional `.env` file and the process environment into a typed
//! `ServiceConfig`. A missing or malformed required variable fails startup
//! rather than falling back silently.

pub mod duration;
pub mod error;
pub mod loader;

pub use error::ConfigError;
pub use loader::ServiceConfig;
