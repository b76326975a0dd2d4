//! Shared substrate used by every engine crate in the workspace: the public
//! error taxonomy (§7 of the design spec), the per-request context threaded
//! through service calls (§5), and time-ordered id generation (§3).
//!
//! Nothing in this crate touches cryptography, storage, or I/O — it exists
//! so that `crypto`, `secrets-engine`, `transit-engine`, `tokenization-engine`,
//! `auth-core` and `audit-engine` can agree on one error shape and one
//! request-context shape without depending on each other.

pub mod context;
pub mod error;
pub mod ids;
pub mod txn;

pub use context::RequestContext;
pub use error::{CoreError, ErrorKind};
pub use ids::new_id;
pub use txn::TxScope;
