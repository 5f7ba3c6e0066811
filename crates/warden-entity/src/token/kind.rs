//! Token type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of an opaque token. Tokens of different kinds are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on every authenticated request.
    Auth,
    /// Long-lived token exchanged for a fresh token pair.
    Refresh,
}

impl TokenType {
    /// All token types, in revocation order.
    pub const ALL: [TokenType; 2] = [TokenType::Auth, TokenType::Refresh];

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = warden_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auth" => Ok(Self::Auth),
            "refresh" => Ok(Self::Refresh),
            _ => Err(warden_core::AppError::validation(format!(
                "Invalid token type: '{s}'. Expected one of: auth, refresh"
            ))),
        }
    }
}
