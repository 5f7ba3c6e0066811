//! Identity and credential entities.

pub mod model;
pub mod security;

pub use model::{CreateIdentity, Identity, LoginIdentifier, normalize_email};
pub use security::{SaltedVerifier, SecurityRecord};
