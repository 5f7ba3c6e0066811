//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::IdentityId;

/// A registered identity: the subject of tokens and the holder of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Unique identity identifier.
    pub id: IdentityId,
    /// Unique email address; usable as a login identifier.
    pub email: String,
    /// Unique user name; usable as a login identifier.
    pub user_name: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Inactive identities cannot log in or authenticate.
    pub active: bool,
    /// When the identity was registered.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Builds a fresh, active identity from registration data.
    pub fn from_create(data: CreateIdentity) -> Self {
        let now = Utc::now();
        Self {
            id: IdentityId::new(),
            email: data.email,
            user_name: data.user_name,
            first_name: data.first_name,
            last_name: data.last_name,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if `login` names this identity.
    pub fn matches_login(&self, login: &LoginIdentifier) -> bool {
        match login {
            LoginIdentifier::Email(email) => self.email == *email,
            LoginIdentifier::UserName(user_name) => self.user_name == *user_name,
        }
    }
}

/// Canonical form of an email: trimmed and lowercased.
///
/// Emails are stored in this form, so stores compare them byte for byte.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A login identifier resolved to the one column it can match.
///
/// User names never contain `@`, so anything with an `@` is an email and
/// everything else is a user name. The two spaces cannot collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    /// Normalized email.
    Email(String),
    /// Exact user name.
    UserName(String),
}

impl LoginIdentifier {
    /// Classifies and normalizes a raw identifier.
    pub fn parse(identifier: &str) -> Self {
        let identifier = identifier.trim();
        if identifier.contains('@') {
            Self::Email(normalize_email(identifier))
        } else {
            Self::UserName(identifier.to_string())
        }
    }

    /// The normalized value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(value) | Self::UserName(value) => value,
        }
    }
}

/// Data required to create a new identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIdentity {
    /// Email address.
    pub email: String,
    /// User name.
    pub user_name: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}
