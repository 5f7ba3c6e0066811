//! # warden-auth
//!
//! Credential hashing, opaque tokens, role-graph authorization, and the
//! identity session flow for Warden.
//!
//! ## Modules
//!
//! - `password`: salted SHA-256 verifiers and password policy
//! - `token`: opaque token issuance, validation, and rotation
//! - `rbac`: role → permission → capability graph queries and enforcement
//! - `store`: credential and role store traits with memory and PostgreSQL backends
//! - `session`: register, login, authenticate, authorize, and token cleanup

pub mod password;
pub mod rbac;
pub mod session;
pub mod store;
pub mod token;

pub use password::{HashEngine, PasswordValidator};
pub use rbac::{AuthorizationGraph, RbacEnforcer, Requirement};
pub use session::{IdentitySessionFlow, RegisterRequest, TokenCleanup};
pub use store::{CredentialStore, MemoryCredentialStore, MemoryRoleStore, RoleStore};
pub use token::{Token, TokenIssuer, TokenPair, TokenValidator};
