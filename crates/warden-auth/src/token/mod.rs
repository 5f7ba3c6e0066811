//! Opaque token issuance, validation, and rotation.
//!
//! Token values are random and carry no claims. The server keeps only
//! the SHA-256 hash of each value in a [`TokenRecord`]; validation looks
//! the record up by that hash.
//!
//! [`TokenRecord`]: warden_entity::token::TokenRecord

pub mod issuer;
pub mod model;
pub mod validator;

pub use issuer::TokenIssuer;
pub use model::{Token, TokenPair};
pub use validator::TokenValidator;

/// Message of every token validation failure.
pub const INVALID_TOKEN: &str = "Invalid or expired token";
