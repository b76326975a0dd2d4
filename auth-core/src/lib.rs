//! Authorization kernel: the path/capability policy matcher, bearer-token
//! issuance and validation, and per-client lockout bookkeeping (design spec
//! §4.6/§4.7).

pub mod config;
pub mod error;
pub mod model;
pub mod policy;
pub mod repository;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use model::{Capability, Client, PolicyDoc, Token};
pub use policy::is_allowed;
pub use repository::{
    ClientRepository, InMemoryClientRepository, InMemoryTokenRepository, TokenRepository,
};
pub use service::AuthService;
