//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use warden_auth::store::{MemoryCredentialStore, MemoryRoleStore, RoleStore};
use warden_auth::{IdentitySessionFlow, RegisterRequest};
use warden_core::config::AppConfig;
use warden_entity::identity::Identity;
use warden_entity::role::{Permission, Role};

/// Test application context over in-memory stores
pub struct TestApp {
    /// The session flow under test
    pub flow: IdentitySessionFlow,
    /// Credential store, for direct state manipulation
    pub credentials: Arc<MemoryCredentialStore>,
    /// Role store, for direct state manipulation
    pub roles: Arc<MemoryRoleStore>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let credentials = Arc::new(MemoryCredentialStore::new());
        let roles = Arc::new(MemoryRoleStore::new());
        let flow = IdentitySessionFlow::new(&config.auth, credentials.clone(), roles.clone());
        Self {
            flow,
            credentials,
            roles,
            config,
        }
    }

    /// Register an identity named `user_name` with an `example.com` email
    pub async fn create_test_identity(&self, user_name: &str, password: &str) -> Identity {
        self.flow
            .register(RegisterRequest::new(
                format!("{user_name}@example.com"),
                user_name,
                password,
            ))
            .await
            .expect("Failed to register test identity")
    }

    /// Create a role with the given permissions
    pub async fn create_role(&self, name: &str, permissions: &[&str]) -> Role {
        let role = permissions
            .iter()
            .fold(Role::new(name), |role, p| role.with_permission(Permission::new(*p)));
        self.roles
            .save_role(role)
            .await
            .expect("Failed to create test role")
    }

    /// Assign a role to an identity
    pub async fn assign(&self, identity: &Identity, role: &Role) {
        self.roles
            .assign_role(identity.id, role.id)
            .await
            .expect("Failed to assign test role");
    }
}
