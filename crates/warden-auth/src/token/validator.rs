//! Presented token validation against persisted token records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use warden_core::error::AppError;
use warden_core::types::IdentityId;
use warden_entity::token::TokenType;

use crate::password::HashEngine;
use crate::password::digest::constant_time_eq;
use crate::store::CredentialStore;

use super::INVALID_TOKEN;

/// Resolves presented tokens back to the identity they were issued for.
///
/// Validation never mutates state; validating the same token twice gives
/// the same answer until it is revoked or expires.
#[derive(Clone)]
pub struct TokenValidator {
    store: Arc<dyn CredentialStore>,
    engine: HashEngine,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator").finish()
    }
}

impl TokenValidator {
    /// Creates a validator reading from `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            engine: HashEngine::new(),
        }
    }

    /// Validates a presented token of the expected type.
    ///
    /// Missing, mismatched, revoked, expired, and wrong-type tokens all fail
    /// with the same `Authentication` error. Store faults propagate as-is.
    pub async fn validate(
        &self,
        presented: &str,
        token_type: TokenType,
    ) -> Result<IdentityId, AppError> {
        self.validate_at(presented, token_type, Utc::now()).await
    }

    /// Like [`TokenValidator::validate`] with an explicit clock reading.
    pub async fn validate_at(
        &self,
        presented: &str,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<IdentityId, AppError> {
        if presented.is_empty() {
            return Err(AppError::authentication(INVALID_TOKEN));
        }

        let token_hash = self.engine.digest(presented);
        let Some(record) = self.store.find_token_record(token_type, &token_hash).await? else {
            debug!(token_type = %token_type, "No record for presented token");
            return Err(AppError::authentication(INVALID_TOKEN));
        };

        let matches = constant_time_eq(record.token_hash.as_bytes(), token_hash.as_bytes());
        if !matches || record.token_type != token_type || !record.is_usable_at(now) {
            debug!(
                subject_id = %record.subject_id,
                token_type = %token_type,
                revoked = record.revoked,
                "Rejected presented token"
            );
            return Err(AppError::authentication(INVALID_TOKEN));
        }

        Ok(record.subject_id)
    }
}
