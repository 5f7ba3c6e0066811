//! Persisted token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::IdentityId;

use super::kind::TokenType;

/// Server-side state of an issued token.
///
/// Only the SHA-256 hash of the opaque value is stored. There is at most
/// one record per subject and token type; issuing a new token replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TokenRecord {
    /// The identity the token stands in for.
    pub subject_id: IdentityId,
    /// Kind of token.
    pub token_type: TokenType,
    /// Hex SHA-256 of the opaque value.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
    /// Set when the token was revoked without deleting the record.
    pub revoked: bool,
}

impl TokenRecord {
    /// Checks whether the record has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks whether a token backed by this record may still be accepted.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}
