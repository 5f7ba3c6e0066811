//! PostgreSQL-backed stores delegating to the `warden-database` repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, RoleId};
use warden_database::DatabasePool;
use warden_database::repositories::{
    IdentityRepository, RoleRepository, SecurityRepository, TokenRepository,
};
use warden_entity::identity::{
    CreateIdentity, Identity, LoginIdentifier, SaltedVerifier, SecurityRecord,
};
use warden_entity::role::{Permission, Role};
use warden_entity::token::{TokenRecord, TokenType};

use super::{CredentialStore, RoleStore, USER_NAME_HAS_AT};

/// Credential store over the identity, security, and token tables.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    identities: IdentityRepository,
    security: SecurityRepository,
    tokens: TokenRepository,
}

impl PgCredentialStore {
    /// Creates a store sharing the given connection pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            identities: IdentityRepository::new(pool.clone()),
            security: SecurityRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn load_security_record(
        &self,
        login: &LoginIdentifier,
    ) -> AppResult<Option<SecurityRecord>> {
        self.security.find_by_login(login).await
    }

    async fn find_security_record(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Option<SecurityRecord>> {
        self.security.find_by_identity(identity_id).await
    }

    async fn save_security_record(
        &self,
        identity_id: IdentityId,
        verifier: SaltedVerifier,
    ) -> AppResult<SecurityRecord> {
        let record = SecurityRecord::new(identity_id, verifier);
        self.security.upsert(&record).await?;
        Ok(record)
    }

    async fn load_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<Option<TokenRecord>> {
        self.tokens.find(subject_id, token_type).await
    }

    async fn find_token_record(
        &self,
        token_type: TokenType,
        token_hash: &str,
    ) -> AppResult<Option<TokenRecord>> {
        self.tokens.find_by_hash(token_type, token_hash).await
    }

    async fn save_token_record(&self, record: TokenRecord) -> AppResult<()> {
        self.tokens.upsert(&record).await
    }

    async fn revoke_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<bool> {
        self.tokens.revoke(subject_id, token_type).await
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.tokens.delete_expired(now).await
    }

    async fn create_identity(
        &self,
        input: CreateIdentity,
        verifier: SaltedVerifier,
    ) -> AppResult<Identity> {
        if input.user_name.contains('@') {
            return Err(AppError::validation(USER_NAME_HAS_AT));
        }
        let identity = Identity::from_create(input);
        let security = SecurityRecord::new(identity.id, verifier);
        self.identities.create(&identity, &security).await
    }

    async fn find_identity(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        self.identities.find_by_id(id).await
    }

    async fn find_identity_by_login(&self, login: &LoginIdentifier) -> AppResult<Option<Identity>> {
        self.identities.find_by_login(login).await
    }

    async fn set_identity_active(&self, id: IdentityId, active: bool) -> AppResult<bool> {
        self.identities.set_active(id, active).await
    }
}

/// Role store over the role graph tables.
#[derive(Debug, Clone)]
pub struct PgRoleStore {
    roles: RoleRepository,
}

impl PgRoleStore {
    /// Creates a store sharing the given connection pool.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            roles: RoleRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn load_roles_for_identity(&self, identity_id: IdentityId) -> AppResult<Vec<Role>> {
        self.roles.find_for_identity(identity_id).await
    }

    async fn find_role(&self, name: &str) -> AppResult<Option<Role>> {
        self.roles.find_by_name(name).await
    }

    async fn save_role(&self, role: Role) -> AppResult<Role> {
        self.roles.create(&role).await
    }

    async fn grant_permission(&self, role_id: RoleId, permission: Permission) -> AppResult<()> {
        self.roles.grant_permission(role_id, &permission).await
    }

    async fn assign_role(&self, identity_id: IdentityId, role_id: RoleId) -> AppResult<()> {
        self.roles.assign(identity_id, role_id).await
    }

    async fn set_permission_active(&self, name: &str, active: bool) -> AppResult<bool> {
        self.roles.set_permission_active(name, active).await
    }

    async fn set_role_active(&self, name: &str, active: bool) -> AppResult<bool> {
        self.roles.set_role_active(name, active).await
    }
}
