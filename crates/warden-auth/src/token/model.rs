//! Issued token values handed to clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::IdentityId;
use warden_entity::token::TokenType;

/// A freshly issued token. The only place the opaque value exists in clear.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The identity the token stands in for.
    pub subject_id: IdentityId,
    /// Kind of token.
    pub token_type: TokenType,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
    /// Hex-encoded random bytes presented by the client.
    pub opaque_value: String,
}

impl Token {
    /// Issue time as seconds since the Unix epoch.
    pub fn issued_at_epoch(&self) -> i64 {
        self.issued_at.timestamp()
    }

    /// Expiry time as seconds since the Unix epoch.
    pub fn expires_at_epoch(&self) -> i64 {
        self.expires_at.timestamp()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("subject_id", &self.subject_id)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("opaque_value", &"<redacted>")
            .finish()
    }
}

/// Result of a login with refresh or of a refresh rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived auth token.
    pub auth: Token,
    /// Long-lived refresh token.
    pub refresh: Token,
}
