//! Security record (credential verifier) repository.

use sqlx::PgPool;

use warden_core::result::AppResult;
use warden_core::types::IdentityId;
use warden_entity::identity::{LoginIdentifier, SecurityRecord};

use super::db_error;

/// Repository for the salted verifiers of identities.
#[derive(Debug, Clone)]
pub struct SecurityRepository {
    pool: PgPool,
}

impl SecurityRepository {
    /// Create a new security record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write the verifier of an identity, superseding any previous one.
    pub async fn upsert(&self, record: &SecurityRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO security_records (identity_id, salt_encoded, stored_hash, updated_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (identity_id) DO UPDATE SET \
             salt_encoded = EXCLUDED.salt_encoded, stored_hash = EXCLUDED.stored_hash, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(record.identity_id)
        .bind(&record.verifier.salt_encoded)
        .bind(&record.verifier.stored_hash)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save security record", e))?;
        Ok(())
    }

    /// Find the verifier of the active identity named by a login identifier.
    pub async fn find_by_login(
        &self,
        login: &LoginIdentifier,
    ) -> AppResult<Option<SecurityRecord>> {
        let sql = match login {
            LoginIdentifier::Email(_) => {
                "SELECT s.* FROM security_records s \
                 INNER JOIN identities i ON i.id = s.identity_id \
                 WHERE i.email = $1 AND i.active"
            }
            LoginIdentifier::UserName(_) => {
                "SELECT s.* FROM security_records s \
                 INNER JOIN identities i ON i.id = s.identity_id \
                 WHERE i.user_name = $1 AND i.active"
            }
        };
        sqlx::query_as::<_, SecurityRecord>(sql)
            .bind(login.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find security record by login", e))
    }

    /// Find the verifier of an active identity by id.
    pub async fn find_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Option<SecurityRecord>> {
        sqlx::query_as::<_, SecurityRecord>(
            "SELECT s.* FROM security_records s \
             INNER JOIN identities i ON i.id = s.identity_id \
             WHERE s.identity_id = $1 AND i.active",
        )
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find security record", e))
    }
}
