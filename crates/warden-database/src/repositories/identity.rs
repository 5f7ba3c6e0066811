//! Identity repository implementation.

use chrono::Utc;
use sqlx::PgPool;

use warden_core::result::AppResult;
use warden_core::types::IdentityId;
use warden_entity::identity::{Identity, LoginIdentifier, SecurityRecord};

use super::db_error;

/// Repository for identity rows.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new identity and its first verifier in one transaction.
    ///
    /// A duplicate email or user name is a `Conflict`; a user name that
    /// trips the no-`@` check constraint is a `Validation` error.
    pub async fn create(
        &self,
        identity: &Identity,
        security: &SecurityRecord,
    ) -> AppResult<Identity> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let created = sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (id, email, user_name, first_name, last_name, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.user_name)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(identity.active)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create identity", e))?;

        sqlx::query(
            "INSERT INTO security_records (identity_id, salt_encoded, stored_hash, updated_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(created.id)
        .bind(&security.verifier.salt_encoded)
        .bind(&security.verifier.stored_hash)
        .bind(security.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to store initial verifier", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit identity", e))?;
        Ok(created)
    }

    /// Find an identity by primary key.
    pub async fn find_by_id(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find identity by id", e))
    }

    /// Find the identity named by a login identifier.
    pub async fn find_by_login(&self, login: &LoginIdentifier) -> AppResult<Option<Identity>> {
        let sql = match login {
            LoginIdentifier::Email(_) => "SELECT * FROM identities WHERE email = $1",
            LoginIdentifier::UserName(_) => "SELECT * FROM identities WHERE user_name = $1",
        };
        sqlx::query_as::<_, Identity>(sql)
            .bind(login.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find identity by login", e))
    }

    /// Activate or deactivate an identity. Returns `true` if a row changed.
    pub async fn set_active(&self, id: IdentityId, active: bool) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE identities SET active = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to update identity status", e))?;
        Ok(result.rows_affected() > 0)
    }
}
