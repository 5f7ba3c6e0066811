//! Persistence seams consumed by the authentication core.
//!
//! The core talks to storage only through [`CredentialStore`] and
//! [`RoleStore`]. Two implementations ship with the crate:
//! - in-memory maps behind a tokio `RwLock` (always built)
//! - PostgreSQL through `warden-database` (feature `postgres`)

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use warden_core::result::AppResult;
use warden_core::types::{IdentityId, RoleId};
use warden_entity::identity::{
    CreateIdentity, Identity, LoginIdentifier, SaltedVerifier, SecurityRecord,
};
use warden_entity::role::Role;
use warden_entity::token::{TokenRecord, TokenType};

pub use memory::{MemoryCredentialStore, MemoryRoleStore};
#[cfg(feature = "postgres")]
pub use postgres::{PgCredentialStore, PgRoleStore};

/// Rejection of a user name that could be mistaken for an email.
pub const USER_NAME_HAS_AT: &str = "Identity 'user_name' must not contain '@'!";

/// Storage of identities, their verifiers, and their token records.
///
/// Implementations must be safe to share across tasks and must surface
/// duplicate writes as `Conflict` and infrastructure faults as
/// `Database` or `ServiceUnavailable`, never as `Authentication`.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Loads the current security record of the active identity named by `login`.
    async fn load_security_record(
        &self,
        login: &LoginIdentifier,
    ) -> AppResult<Option<SecurityRecord>>;

    /// Loads the current security record of an active identity by id.
    async fn find_security_record(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Option<SecurityRecord>>;

    /// Writes a new verifier for `identity_id`, superseding any previous one.
    async fn save_security_record(
        &self,
        identity_id: IdentityId,
        verifier: SaltedVerifier,
    ) -> AppResult<SecurityRecord>;

    /// Loads the token record of a subject for one token type.
    async fn load_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<Option<TokenRecord>>;

    /// Finds the token record of a type by the hash of its opaque value.
    async fn find_token_record(
        &self,
        token_type: TokenType,
        token_hash: &str,
    ) -> AppResult<Option<TokenRecord>>;

    /// Saves a token record, replacing the subject's record of the same type.
    async fn save_token_record(&self, record: TokenRecord) -> AppResult<()>;

    /// Marks a token record revoked. Returns `true` if a live record was revoked.
    async fn revoke_token_record(
        &self,
        subject_id: IdentityId,
        token_type: TokenType,
    ) -> AppResult<bool>;

    /// Deletes every token record revoked or expired at `now`. Returns how many went.
    async fn purge_expired_tokens(&self, now: chrono::DateTime<chrono::Utc>) -> AppResult<u64>;

    /// Persists a new identity together with its first verifier, atomically.
    ///
    /// `input.email` must already be normalized. A duplicate email or user
    /// name is a `Conflict`; a user name containing `@` is a `Validation`
    /// error. On any failure neither the identity nor the verifier is kept.
    async fn create_identity(
        &self,
        input: CreateIdentity,
        verifier: SaltedVerifier,
    ) -> AppResult<Identity>;

    /// Finds an identity by id.
    async fn find_identity(&self, id: IdentityId) -> AppResult<Option<Identity>>;

    /// Finds the identity named by `login`.
    async fn find_identity_by_login(&self, login: &LoginIdentifier) -> AppResult<Option<Identity>>;

    /// Activates or deactivates an identity. Returns `false` if it does not exist.
    async fn set_identity_active(&self, id: IdentityId, active: bool) -> AppResult<bool>;
}

/// Storage of the role → permission → capability graph.
#[async_trait]
pub trait RoleStore: Send + Sync + std::fmt::Debug {
    /// Loads every role assigned to an identity with its permissions and
    /// capabilities populated.
    async fn load_roles_for_identity(&self, identity_id: IdentityId) -> AppResult<Vec<Role>>;

    /// Loads a role by exact name.
    async fn find_role(&self, name: &str) -> AppResult<Option<Role>>;

    /// Persists a new role with its permissions and capabilities.
    /// Duplicate role names are a `Conflict`.
    async fn save_role(&self, role: Role) -> AppResult<Role>;

    /// Links a permission to an existing role after its current permissions.
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission: warden_entity::role::Permission,
    ) -> AppResult<()>;

    /// Assigns a role to an identity. Assigning twice is a no-op.
    async fn assign_role(&self, identity_id: IdentityId, role_id: RoleId) -> AppResult<()>;

    /// Flips the active flag of a permission everywhere it is linked.
    /// Returns `false` if no permission has that name.
    async fn set_permission_active(&self, name: &str, active: bool) -> AppResult<bool>;

    /// Flips the active flag of a role. Returns `false` if no role has that name.
    async fn set_role_active(&self, name: &str, active: bool) -> AppResult<bool>;
}
