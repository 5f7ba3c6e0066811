//! # warden-database
//!
//! PostgreSQL connection management, embedded migrations, and concrete
//! repositories for identities, credentials, tokens, and roles.

pub mod pool;
pub mod repositories;

pub use pool::{DatabasePool, redact_url};
