//! In-memory stores using a tokio `RwLock` for single-process deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, RoleId};
use warden_entity::identity::{
    CreateIdentity, Identity, LoginIdentifier, SaltedVerifier, SecurityRecord,
};
use warden_entity::role::{Permission, Role};
use warden_entity::token::{TokenRecord, TokenType};

use super::{CredentialStore, RoleStore, USER_NAME_HAS_AT};

/// Internal state of the in-memory credential store.
#[derive(Debug, Default)]
struct CredentialState {
    identities: HashMap<IdentityId, Identity>,
    security: HashMap<IdentityId, SecurityRecord>,
    tokens: HashMap<(IdentityId, TokenType), TokenRecord>,
}

impl CredentialState {
    fn identity_by_login(&self, login: &LoginIdentifier) -> Option<&Identity> {
        self.identities
            .values()
            .find(|identity| identity.matches_login(login))
    }

    fn active_security_record(&self, identity: Option<&Identity>) -> Option<SecurityRecord> {
        identity
            .filter(|identity| identity.active)
            .and_then(|identity| self.security.get(&identity.id))
            .cloned()
    }
}

/// Credential store backed by process-local maps.
///
/// State is lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    state: Arc<RwLock<CredentialState>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load_security_record(
        &self,
        login: &LoginIdentifier,
    ) -> AppResult<Option<SecurityRecord>> {
        let state = self.state.read().await;
        Ok(state.active_security_record(state.identity_by_login(login)))
    }

    async fn find_security_record(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Option<SecurityRecord>> {
        let state = self.state.read().await;
        Ok(state.active_security_record(state.identities.get(&identity_id)))
    }

    async fn save_security_record(
        &self,
        identity_id: IdentityId,
        verifier: SaltedVerifier,
    ) -> AppResult<SecurityRecord> {
        let mut state = self.state.write().await;
        if !state.identities.contains_key(&identity_id) {
            return Err(AppError::not_found(format!(
                "Identity {identity_id} not found"
            )));
        }
        let record = SecurityRecord::new(identity_id, verifier);
        state.security.insert(identity_id, record.clone());
        Ok(record)
    }

    async fn load_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<Option<TokenRecord>> {
        let state = self.state.read().await;
        Ok(state.tokens.get(&(subject_id, token_type)).cloned())
    }

    async fn find_token_record(
        &self,
        token_type: TokenType,
        token_hash: &str,
    ) -> AppResult<Option<TokenRecord>> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .values()
            .find(|r| r.token_type == token_type && r.token_hash == token_hash)
            .cloned())
    }

    async fn save_token_record(&self, record: TokenRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .tokens
            .insert((record.subject_id, record.token_type), record);
        Ok(())
    }

    async fn revoke_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.tokens.get_mut(&(subject_id, token_type)) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state.tokens.retain(|_, record| record.is_usable_at(now));
        Ok((before - state.tokens.len()) as u64)
    }

    async fn create_identity(
        &self,
        input: CreateIdentity,
        verifier: SaltedVerifier,
    ) -> AppResult<Identity> {
        if input.user_name.contains('@') {
            return Err(AppError::validation(USER_NAME_HAS_AT));
        }
        let mut state = self.state.write().await;
        let duplicate = state
            .identities
            .values()
            .any(|existing| existing.email == input.email || existing.user_name == input.user_name);
        if duplicate {
            return Err(AppError::conflict(
                "An identity with this email or user name already exists",
            ));
        }
        let identity = Identity::from_create(input);
        state
            .security
            .insert(identity.id, SecurityRecord::new(identity.id, verifier));
        state.identities.insert(identity.id, identity.clone());
        debug!(identity_id = %identity.id, "Stored identity in memory");
        Ok(identity)
    }

    async fn find_identity(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state.identities.get(&id).cloned())
    }

    async fn find_identity_by_login(&self, login: &LoginIdentifier) -> AppResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state.identity_by_login(login).cloned())
    }

    async fn set_identity_active(&self, id: IdentityId, active: bool) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.identities.get_mut(&id) {
            Some(identity) => {
                identity.active = active;
                identity.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Internal state of the in-memory role store.
#[derive(Debug, Default)]
struct RoleState {
    /// Roles in creation order.
    roles: Vec<Role>,
    /// Role ids assigned to each identity, in assignment order.
    assignments: HashMap<IdentityId, Vec<RoleId>>,
}

impl RoleState {
    /// Permissions are shared nodes keyed by name: a permission saved under
    /// an existing name adopts that node's id and active flag.
    fn canonicalize(&self, mut permission: Permission) -> Permission {
        let existing = self
            .roles
            .iter()
            .flat_map(|role| role.permissions.iter())
            .find(|p| p.name == permission.name);
        if let Some(existing) = existing {
            permission.id = existing.id;
            permission.active = existing.active;
        }
        permission
    }
}

/// Role store backed by process-local maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    state: Arc<RwLock<RoleState>>,
}

impl MemoryRoleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn load_roles_for_identity(&self, identity_id: IdentityId) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let Some(role_ids) = state.assignments.get(&identity_id) else {
            return Ok(Vec::new());
        };
        Ok(role_ids
            .iter()
            .filter_map(|id| state.roles.iter().find(|role| role.id == *id))
            .cloned()
            .collect())
    }

    async fn find_role(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.iter().find(|role| role.name == name).cloned())
    }

    async fn save_role(&self, mut role: Role) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.iter().any(|existing| existing.name == role.name) {
            return Err(AppError::conflict(format!(
                "Role '{}' already exists",
                role.name
            )));
        }
        role.permissions = std::mem::take(&mut role.permissions)
            .into_iter()
            .map(|p| state.canonicalize(p))
            .collect();
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn grant_permission(&self, role_id: RoleId, permission: Permission) -> AppResult<()> {
        let mut state = self.state.write().await;
        let permission = state.canonicalize(permission);
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))?;
        if role.permission_named(&permission.name).is_none() {
            role.permissions.push(permission);
        }
        Ok(())
    }

    async fn assign_role(&self, identity_id: IdentityId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.iter().any(|role| role.id == role_id) {
            return Err(AppError::not_found(format!("Role {role_id} not found")));
        }
        let assigned = state.assignments.entry(identity_id).or_default();
        if !assigned.contains(&role_id) {
            assigned.push(role_id);
        }
        Ok(())
    }

    async fn set_permission_active(&self, name: &str, active: bool) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let mut found = false;
        for permission in state
            .roles
            .iter_mut()
            .flat_map(|role| role.permissions.iter_mut())
            .filter(|p| p.name == name)
        {
            permission.active = active;
            found = true;
        }
        Ok(found)
    }

    async fn set_role_active(&self, name: &str, active: bool) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.roles.iter_mut().find(|role| role.name == name) {
            Some(role) => {
                role.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use warden_core::error::ErrorKind;

    use super::*;

    fn create(email: &str, user_name: &str) -> CreateIdentity {
        CreateIdentity {
            email: email.to_string(),
            user_name: user_name.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    fn verifier() -> SaltedVerifier {
        SaltedVerifier {
            salt_encoded: "6162".to_string(),
            stored_hash: "0".repeat(128),
        }
    }

    #[tokio::test]
    async fn test_duplicate_identity_is_conflict() {
        let store = MemoryCredentialStore::new();
        store.create_identity(create("a@example.com", "a"), verifier()).await.unwrap();

        let err = store
            .create_identity(create("a@example.com", "other"), verifier())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        let err = store
            .create_identity(create("b@example.com", "a"), verifier())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_user_name_with_at_is_rejected_without_side_effects() {
        let store = MemoryCredentialStore::new();
        let err = store
            .create_identity(create("b@example.com", "a@example.com"), verifier())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let login = LoginIdentifier::parse("b@example.com");
        assert!(store.find_identity_by_login(&login).await.unwrap().is_none());
        assert!(store.load_security_record(&login).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_and_verifier_are_stored_together() {
        let store = MemoryCredentialStore::new();
        let identity = store
            .create_identity(create("a@example.com", "a"), verifier())
            .await
            .unwrap();

        let by_id = store.find_security_record(identity.id).await.unwrap().unwrap();
        assert_eq!(by_id.verifier, verifier());
        assert!(store.find_security_record(IdentityId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_security_record_hidden_for_inactive_identity() {
        let store = MemoryCredentialStore::new();
        let identity = store
            .create_identity(create("a@example.com", "a"), verifier())
            .await
            .unwrap();

        let by_name = LoginIdentifier::parse("a");
        assert!(store.load_security_record(&by_name).await.unwrap().is_some());
        assert!(
            store
                .load_security_record(&LoginIdentifier::parse("A@example.com"))
                .await
                .unwrap()
                .is_some()
        );

        assert!(store.set_identity_active(identity.id, false).await.unwrap());
        assert!(store.load_security_record(&by_name).await.unwrap().is_none());
        assert!(store.find_security_record(identity.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_security_record_requires_identity() {
        let store = MemoryCredentialStore::new();
        let err = store
            .save_security_record(IdentityId::new(), verifier())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_token_records_replace_and_purge() {
        let store = MemoryCredentialStore::new();
        let subject = IdentityId::new();
        let now = Utc::now();
        let record = |hash: &str, expires_at| TokenRecord {
            subject_id: subject,
            token_type: TokenType::Auth,
            token_hash: hash.to_string(),
            issued_at: now,
            expires_at,
            revoked: false,
        };

        store.save_token_record(record("aa", now + Duration::minutes(5))).await.unwrap();
        store.save_token_record(record("bb", now - Duration::minutes(1))).await.unwrap();

        assert!(store.find_token_record(TokenType::Auth, "aa").await.unwrap().is_none());
        assert!(store.find_token_record(TokenType::Auth, "bb").await.unwrap().is_some());
        assert!(store.find_token_record(TokenType::Refresh, "bb").await.unwrap().is_none());

        assert!(!store.revoke_token_record(subject, TokenType::Refresh).await.unwrap());
        assert_eq!(store.purge_expired_tokens(now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_revoked_record_is_kept_until_purge() {
        let store = MemoryCredentialStore::new();
        let subject = IdentityId::new();
        let now = Utc::now();
        store
            .save_token_record(TokenRecord {
                subject_id: subject,
                token_type: TokenType::Refresh,
                token_hash: "cc".to_string(),
                issued_at: now,
                expires_at: now + Duration::hours(1),
                revoked: false,
            })
            .await
            .unwrap();

        assert!(store.revoke_token_record(subject, TokenType::Refresh).await.unwrap());
        assert!(!store.revoke_token_record(subject, TokenType::Refresh).await.unwrap());

        let record = store.load_token_record(subject, TokenType::Refresh).await.unwrap().unwrap();
        assert!(record.revoked);
        assert!(!record.is_usable_at(now));

        assert_eq!(store.purge_expired_tokens(now).await.unwrap(), 1);
        assert!(store.load_token_record(subject, TokenType::Refresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_permission_nodes_are_shared_by_name() {
        let store = MemoryRoleStore::new();
        let admin = store
            .save_role(Role::new("Admin").with_permission(Permission::new("write")))
            .await
            .unwrap();
        let editor = store
            .save_role(Role::new("Editor").with_permission(Permission::new("write")))
            .await
            .unwrap();
        assert_eq!(admin.permissions[0].id, editor.permissions[0].id);

        assert!(store.set_permission_active("write", false).await.unwrap());
        let editor = store.find_role("Editor").await.unwrap().unwrap();
        assert!(!editor.permissions[0].active);
        assert!(!store.set_permission_active("missing", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_assign_role_is_idempotent() {
        let store = MemoryRoleStore::new();
        let role = store.save_role(Role::new("Reader")).await.unwrap();
        let identity = IdentityId::new();

        store.assign_role(identity, role.id).await.unwrap();
        store.assign_role(identity, role.id).await.unwrap();
        assert_eq!(store.load_roles_for_identity(identity).await.unwrap().len(), 1);

        let err = store.assign_role(identity, RoleId::new()).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_duplicate_role_is_conflict() {
        let store = MemoryRoleStore::new();
        store.save_role(Role::new("Admin")).await.unwrap();
        let err = store.save_role(Role::new("Admin")).await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }
}
