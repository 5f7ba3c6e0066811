//! # warden-entity
//!
//! Entity models for Warden. Every struct here is either a database row
//! (deriving `sqlx::FromRow`) or a value object handed between the
//! stores and the authentication core. Serialized shapes are the
//! explicitly declared fields, nothing more.

pub mod identity;
pub mod role;
pub mod token;
