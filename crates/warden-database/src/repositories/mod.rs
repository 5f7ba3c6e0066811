//! Repository implementations for Warden entities.

pub mod identity;
pub mod role;
pub mod security;
pub mod token;

pub use identity::IdentityRepository;
pub use role::RoleRepository;
pub use security::SecurityRepository;
pub use token::TokenRepository;

use warden_core::error::{AppError, ErrorKind};

/// Maps a sqlx error into an [`AppError`], keeping unique-key and check
/// violations and pool exhaustion distinguishable from other database faults.
pub(crate) fn db_error(context: &'static str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        sqlx::Error::Database(db) if db.is_check_violation() => ErrorKind::Validation,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, context, err)
}
