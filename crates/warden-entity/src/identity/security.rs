//! Persisted credential material for an identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::IdentityId;

/// The salted verifier stored for an identity in place of its secret.
///
/// `stored_hash` is two concatenated hex digests: the digest of the
/// secret followed by the digest of (that digest + raw salt).
/// `salt_encoded` is the hex encoding of the raw salt and must decode
/// back to it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SaltedVerifier {
    /// Hex encoding of the raw salt string.
    pub salt_encoded: String,
    /// `base_hash || combined_hash`.
    pub stored_hash: String,
}

impl fmt::Debug for SaltedVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedVerifier")
            .field("salt_encoded", &"<redacted>")
            .field("stored_hash", &"<redacted>")
            .finish()
    }
}

/// One row of the credential store: the current verifier of an identity.
///
/// A password change writes a new record that supersedes this one; the
/// verifier itself is never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityRecord {
    /// Owning identity.
    pub identity_id: IdentityId,
    /// The verifier material.
    #[sqlx(flatten)]
    pub verifier: SaltedVerifier,
    /// When this verifier was written.
    pub updated_at: DateTime<Utc>,
}

impl SecurityRecord {
    /// Creates a record for `identity_id` stamped with the current time.
    pub fn new(identity_id: IdentityId, verifier: SaltedVerifier) -> Self {
        Self {
            identity_id,
            verifier,
            updated_at: Utc::now(),
        }
    }
}
