//! Identity session flow: register, login, authenticate, authorize.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::IdentityId;
use warden_entity::identity::{Identity, LoginIdentifier, SaltedVerifier, SecurityRecord};
use warden_entity::role::Role;
use warden_entity::token::TokenType;

use crate::password::{HashEngine, PasswordValidator, generate_salt};
use crate::rbac::{RbacEnforcer, Requirement};
use crate::store::{CredentialStore, RoleStore};
use crate::token::{INVALID_TOKEN, Token, TokenIssuer, TokenPair, TokenValidator};

use super::request::RegisterRequest;

/// Message of every credential failure, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Orchestrates the identity lifecycle over the credential and role stores.
///
/// Credential failures are indistinguishable to callers: an unknown
/// identifier, an inactive identity, and a wrong secret all produce the
/// same `Authentication` error, and an unknown identifier still pays for
/// one verification.
#[derive(Clone)]
pub struct IdentitySessionFlow {
    credentials: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleStore>,
    engine: HashEngine,
    password_validator: PasswordValidator,
    issuer: TokenIssuer,
    enforcer: RbacEnforcer,
    /// Verified against when the identifier is unknown.
    dummy_verifier: SaltedVerifier,
}

impl std::fmt::Debug for IdentitySessionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySessionFlow")
            .field("issuer", &self.issuer)
            .field("password_validator", &self.password_validator)
            .finish()
    }
}

impl IdentitySessionFlow {
    /// Creates a flow over the given stores.
    pub fn new(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        let engine = HashEngine::new();
        let dummy_verifier =
            engine.salted_verifier(&engine.digest(&generate_salt()), &generate_salt());

        Self {
            issuer: TokenIssuer::new(config, Arc::clone(&credentials)),
            password_validator: PasswordValidator::new(config),
            enforcer: RbacEnforcer::new(),
            credentials,
            roles,
            engine,
            dummy_verifier,
        }
    }

    /// The credential store.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// The role store.
    pub fn roles(&self) -> &Arc<dyn RoleStore> {
        &self.roles
    }

    /// The token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// The token validator.
    pub fn validator(&self) -> &TokenValidator {
        self.issuer.validator()
    }

    /// Registers a new identity and stores its salted verifier in one write.
    ///
    /// Invalid input fails with a `Validation` error whose `details` list
    /// one message per field; a taken email or user name is a `Conflict`.
    pub async fn register(&self, request: RegisterRequest) -> Result<Identity, AppError> {
        let request = request.normalized();
        let mut details = request.field_errors();
        if !request.password.is_empty() {
            if let Err(policy) = self.password_validator.validate(&request.password) {
                details.push(policy.message);
            }
        }
        if !details.is_empty() {
            return Err(AppError::validation_fields("Identity is invalid", details));
        }

        let (create, password) = request.into_parts();
        let verifier = self.make_verifier(&password);
        let identity = self.credentials.create_identity(create, verifier).await?;

        info!(identity_id = %identity.id, user_name = %identity.user_name, "Registered identity");
        Ok(identity)
    }

    /// Verifies credentials and issues an auth token.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Token, AppError> {
        let identity_id = self.verify_credentials(identifier, secret).await?;
        self.issuer.issue(identity_id, TokenType::Auth).await
    }

    /// Verifies credentials and issues an auth + refresh pair.
    pub async fn login_with_refresh(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<TokenPair, AppError> {
        let identity_id = self.verify_credentials(identifier, secret).await?;
        self.issuer.issue_pair(identity_id).await
    }

    /// Resolves a presented token to its active identity.
    pub async fn authenticate(
        &self,
        presented: &str,
        token_type: TokenType,
    ) -> Result<Identity, AppError> {
        let subject_id = self.issuer.validator().validate(presented, token_type).await?;
        match self.credentials.find_identity(subject_id).await? {
            Some(identity) if identity.active => Ok(identity),
            _ => {
                warn!(subject_id = %subject_id, "Token subject missing or inactive");
                Err(AppError::authentication(INVALID_TOKEN))
            }
        }
    }

    /// Checks whether `identity` satisfies `requirement` through its roles.
    pub async fn authorize(
        &self,
        identity: &Identity,
        requirement: &Requirement,
    ) -> Result<bool, AppError> {
        if !identity.active {
            return Ok(false);
        }
        let roles = self.roles_of(identity).await?;
        Ok(self.enforcer.graph().permits(&roles, requirement))
    }

    /// Like [`IdentitySessionFlow::authorize`] but fails with an
    /// `Authorization` error naming the missing grant.
    pub async fn require(
        &self,
        identity: &Identity,
        requirement: &Requirement,
    ) -> Result<(), AppError> {
        let roles = if identity.active {
            self.roles_of(identity).await?
        } else {
            Vec::new()
        };
        self.enforcer.require(&roles, requirement).inspect_err(|_| {
            info!(
                identity_id = %identity.id,
                requirement = %requirement,
                "Authorization denied"
            );
        })
    }

    /// Roles assigned to `identity`, fully populated.
    pub async fn roles_of(&self, identity: &Identity) -> Result<Vec<Role>, AppError> {
        self.roles.load_roles_for_identity(identity.id).await
    }

    /// Names of the permissions `identity` effectively holds.
    pub async fn permissions_of(&self, identity: &Identity) -> Result<BTreeSet<String>, AppError> {
        if !identity.active {
            return Ok(BTreeSet::new());
        }
        let roles = self.roles_of(identity).await?;
        Ok(self.enforcer.graph().permissions_of(&roles))
    }

    /// Exchanges a refresh token for a new pair. The old refresh token stops working.
    pub async fn refresh(&self, presented_refresh: &str) -> Result<TokenPair, AppError> {
        self.authenticate(presented_refresh, TokenType::Refresh)
            .await?;
        self.issuer.rotate(presented_refresh).await
    }

    /// Revokes every token of `subject_id`.
    pub async fn logout(&self, subject_id: IdentityId) -> Result<(), AppError> {
        self.issuer.revoke_all(subject_id).await?;
        info!(subject_id = %subject_id, "Logged out");
        Ok(())
    }

    /// Replaces the secret of an identity after verifying the current one.
    ///
    /// The new verifier uses a fresh salt and every outstanding token is revoked.
    pub async fn change_password(
        &self,
        identity_id: IdentityId,
        current: &str,
        new: &str,
    ) -> Result<(), AppError> {
        let record = self.credentials.find_security_record(identity_id).await?;
        self.check_secret(record.as_ref(), current)?;

        self.password_validator.validate_not_same(current, new)?;
        self.password_validator.validate(new)?;

        self.credentials
            .save_security_record(identity_id, self.make_verifier(new))
            .await?;
        self.issuer.revoke_all(identity_id).await?;

        info!(identity_id = %identity_id, "Password changed");
        Ok(())
    }

    async fn verify_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<IdentityId, AppError> {
        let login = LoginIdentifier::parse(identifier);
        let record = self.credentials.load_security_record(&login).await?;
        self.check_secret(record.as_ref(), secret)
    }

    /// Verifies `secret` against `record`, or against the dummy verifier
    /// when there is no record.
    fn check_secret(
        &self,
        record: Option<&SecurityRecord>,
        secret: &str,
    ) -> Result<IdentityId, AppError> {
        let verified = match record {
            Some(record) => self
                .engine
                .verify_against(secret, &record.verifier)
                .then_some(record.identity_id),
            None => {
                self.engine.verify_against(secret, &self.dummy_verifier);
                None
            }
        };

        verified.ok_or_else(|| {
            warn!("Failed login attempt");
            AppError::authentication(INVALID_CREDENTIALS)
        })
    }

    fn make_verifier(&self, secret: &str) -> SaltedVerifier {
        self.engine
            .salted_verifier(&self.engine.digest(secret), &generate_salt())
    }
}

#[cfg(test)]
mod tests {
    use warden_core::error::ErrorKind;
    use warden_entity::role::{Permission, Role};

    use super::*;
    use crate::store::{MemoryCredentialStore, MemoryRoleStore};

    fn flow() -> IdentitySessionFlow {
        IdentitySessionFlow::new(
            &AuthConfig::default(),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryRoleStore::new()),
        )
    }

    async fn register_roh(flow: &IdentitySessionFlow) -> Identity {
        flow.register(RegisterRequest::new("roh@example.com", "roh", "Password"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_login_authenticate() {
        let flow = flow();
        let identity = register_roh(&flow).await;

        let token = flow.login("roh@example.com", "Password").await.unwrap();
        assert_eq!(token.token_type, TokenType::Auth);
        assert_eq!(token.subject_id, identity.id);

        let resolved = flow
            .authenticate(&token.opaque_value, TokenType::Auth)
            .await
            .unwrap();
        assert_eq!(resolved.id, identity.id);

        let err = flow
            .authenticate(&token.opaque_value, TokenType::Refresh)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authentication));
    }

    #[tokio::test]
    async fn test_register_stores_verifier_with_identity() {
        let flow = flow();
        let identity = register_roh(&flow).await;
        let record = flow
            .credentials()
            .find_security_record(identity.id)
            .await
            .unwrap()
            .unwrap();
        assert!(flow.engine.verify_against("Password", &record.verifier));
    }

    #[tokio::test]
    async fn test_login_by_user_name() {
        let flow = flow();
        register_roh(&flow).await;
        assert!(flow.login("roh", "Password").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let flow = flow();
        register_roh(&flow).await;

        let wrong = flow.login("roh@example.com", "password").await.unwrap_err();
        let unknown = flow.login("nobody@example.com", "Password").await.unwrap_err();

        assert_eq!(wrong.kind, ErrorKind::Authentication);
        assert_eq!(wrong.kind, unknown.kind);
        assert_eq!(wrong.message, unknown.message);
    }

    #[tokio::test]
    async fn test_register_validation_details() {
        let flow = flow();
        let err = flow
            .register(RegisterRequest::new("", "roh", "short"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert_eq!(err.details.len(), 2);
        assert_eq!(err.details[0], "Identity 'email' is required!");
        assert!(err.details[1].starts_with("Password must be at least"));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let flow = flow();
        register_roh(&flow).await;
        let err = flow
            .register(RegisterRequest::new("ROH@example.com", "roh2", "Password"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_authorize_and_require() {
        let flow = flow();
        let identity = register_roh(&flow).await;
        let editor = flow
            .roles()
            .save_role(Role::new("Editor").with_permission(Permission::new("read")))
            .await
            .unwrap();
        flow.roles().assign_role(identity.id, editor.id).await.unwrap();

        assert!(flow.authorize(&identity, &Requirement::permission("read")).await.unwrap());
        assert!(!flow.authorize(&identity, &Requirement::permission("write")).await.unwrap());

        let err = flow
            .require(&identity, &Requirement::permission("write"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
        assert!(err.message.contains("write"));
    }

    #[tokio::test]
    async fn test_change_password_revokes_tokens() {
        let flow = flow();
        let identity = register_roh(&flow).await;
        let pair = flow.login_with_refresh("roh", "Password").await.unwrap();

        let err = flow
            .change_password(identity.id, "Password", "Password")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let err = flow
            .change_password(identity.id, "wrong", "NewPassword")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authentication));

        flow.change_password(identity.id, "Password", "NewPassword")
            .await
            .unwrap();

        assert!(flow.login("roh", "Password").await.is_err());
        assert!(flow.login("roh", "NewPassword").await.is_ok());
        assert!(flow.authenticate(&pair.auth.opaque_value, TokenType::Auth).await.is_err());
        assert!(flow.refresh(&pair.refresh.opaque_value).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_and_refresh() {
        let flow = flow();
        let identity = register_roh(&flow).await;
        let pair = flow.login_with_refresh("roh", "Password").await.unwrap();

        let rotated = flow.refresh(&pair.refresh.opaque_value).await.unwrap();
        assert!(flow.refresh(&pair.refresh.opaque_value).await.is_err());

        flow.logout(identity.id).await.unwrap();
        assert!(flow.authenticate(&rotated.auth.opaque_value, TokenType::Auth).await.is_err());
        assert!(flow.refresh(&rotated.refresh.opaque_value).await.is_err());
    }
}
