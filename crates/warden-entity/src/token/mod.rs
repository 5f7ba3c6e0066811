//! Token entities.

pub mod kind;
pub mod record;

pub use kind::TokenType;
pub use record::TokenRecord;
