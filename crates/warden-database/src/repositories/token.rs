//! Token record repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_core::result::AppResult;
use warden_core::types::IdentityId;
use warden_entity::token::{TokenRecord, TokenType};

use super::db_error;

/// Repository for hashed token records.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a token record, replacing the subject's previous one of the same type.
    pub async fn upsert(&self, record: &TokenRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO token_records (subject_id, token_type, token_hash, issued_at, expires_at, revoked) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (subject_id, token_type) DO UPDATE SET \
             token_hash = EXCLUDED.token_hash, issued_at = EXCLUDED.issued_at, \
             expires_at = EXCLUDED.expires_at, revoked = EXCLUDED.revoked",
        )
        .bind(record.subject_id)
        .bind(record.token_type)
        .bind(&record.token_hash)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(record.revoked)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save token record", e))?;
        Ok(())
    }

    /// Find the record of a subject for one token type.
    pub async fn find(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<Option<TokenRecord>> {
        sqlx::query_as::<_, TokenRecord>(
            "SELECT * FROM token_records WHERE subject_id = $1 AND token_type = $2",
        )
        .bind(subject_id)
        .bind(token_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find token record", e))
    }

    /// Find a record by token type and token hash.
    pub async fn find_by_hash(
        &self,
        token_type: TokenType,
        token_hash: &str,
    ) -> AppResult<Option<TokenRecord>> {
        sqlx::query_as::<_, TokenRecord>(
            "SELECT * FROM token_records WHERE token_type = $1 AND token_hash = $2",
        )
        .bind(token_type)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find token record by hash", e))
    }

    /// Mark the live record of a subject for one token type revoked.
    /// Returns `true` if a record changed.
    pub async fn revoke(&self, subject_id: IdentityId, token_type: TokenType) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE token_records SET revoked = TRUE              WHERE subject_id = $1 AND token_type = $2 AND NOT revoked",
        )
        .bind(subject_id)
        .bind(token_type)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke token record", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every record revoked or expired at `now`. Returns the number removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM token_records WHERE expires_at <= $1 OR revoked")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to purge expired token records", e))?;
        Ok(result.rows_affected())
    }
}
