//! # warden-core
//!
//! Core crate for Warden. Contains configuration schemas, typed
//! identifiers, and the unified error system shared by every other
//! crate in the workspace.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
