//! Opaque token creation, revocation, and refresh rotation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::IdentityId;
use warden_entity::token::{TokenRecord, TokenType};

use crate::password::HashEngine;
use crate::store::CredentialStore;

use super::model::{Token, TokenPair};
use super::validator::TokenValidator;

/// Number of random bytes in an opaque token value.
pub const TOKEN_BYTES: usize = 32;

/// Mints typed, time-bounded opaque tokens and persists their hashes.
///
/// Each subject holds at most one live token per type; issuing a token
/// replaces the previous record of that type.
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    validator: TokenValidator,
    engine: HashEngine,
    /// Auth token TTL.
    auth_ttl: Duration,
    /// Refresh token TTL.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("auth_ttl", &self.auth_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        let auth_ttl = i64::try_from(config.auth_token_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        let refresh_ttl = i64::try_from(config.refresh_token_ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX);

        Self {
            validator: TokenValidator::new(Arc::clone(&store)),
            store,
            engine: HashEngine::new(),
            auth_ttl,
            refresh_ttl,
        }
    }

    /// Returns the validator sharing this issuer's store.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Lifetime of tokens of `token_type`.
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Auth => self.auth_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Issues a token of `token_type` for `subject_id`.
    pub async fn issue(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> Result<Token, AppError> {
        self.issue_at(subject_id, token_type, Utc::now()).await
    }

    /// Like [`TokenIssuer::issue`] with an explicit clock reading.
    pub async fn issue_at(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Token, AppError> {
        let opaque_value = hex::encode(rand::random::<[u8; TOKEN_BYTES]>());
        let expires_at = now
            .checked_add_signed(self.ttl(token_type))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.store
            .save_token_record(TokenRecord {
                subject_id,
                token_type,
                token_hash: self.engine.digest(&opaque_value),
                issued_at: now,
                expires_at,
                revoked: false,
            })
            .await?;

        info!(
            subject_id = %subject_id,
            token_type = %token_type,
            expires_at = %expires_at,
            "Issued token"
        );

        Ok(Token {
            subject_id,
            token_type,
            issued_at: now,
            expires_at,
            opaque_value,
        })
    }

    /// Issues a fresh auth + refresh pair, replacing both records.
    pub async fn issue_pair(&self, subject_id: IdentityId) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let auth = self.issue_at(subject_id, TokenType::Auth, now).await?;
        let refresh = self.issue_at(subject_id, TokenType::Refresh, now).await?;
        Ok(TokenPair { auth, refresh })
    }

    /// Revokes the subject's token of `token_type`. Returns `true` if a live
    /// token was revoked. The record stays until the next purge.
    pub async fn revoke(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> Result<bool, AppError> {
        let revoked = self.store.revoke_token_record(subject_id, token_type).await?;
        if revoked {
            info!(subject_id = %subject_id, token_type = %token_type, "Revoked token");
        }
        Ok(revoked)
    }

    /// Revokes every token type of the subject.
    pub async fn revoke_all(&self, subject_id: IdentityId) -> Result<(), AppError> {
        for token_type in TokenType::ALL {
            self.revoke(subject_id, token_type).await?;
        }
        Ok(())
    }

    /// Exchanges a valid refresh token for a new pair.
    ///
    /// The presented refresh token stops validating because its record is
    /// replaced by the new refresh record.
    pub async fn rotate(&self, presented_refresh: &str) -> Result<TokenPair, AppError> {
        let subject_id = self
            .validator
            .validate(presented_refresh, TokenType::Refresh)
            .await?;
        let pair = self.issue_pair(subject_id).await?;
        info!(subject_id = %subject_id, "Rotated refresh token");
        Ok(pair)
    }
}
