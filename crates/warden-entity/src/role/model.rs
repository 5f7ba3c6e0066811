//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::RoleId;

use super::capability::Capability;
use super::permission::Permission;

/// A named bundle of permissions assigned to identities.
///
/// Roles are flat: a role never inherits another role's permissions.
/// `permissions` keeps the order in which the links were made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Canonical role name.
    pub name: String,
    /// Inactive roles grant nothing.
    pub active: bool,
    /// Free-form metadata (JSON object).
    pub metadata: serde_json::Value,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// Linked permissions, in link order.
    #[sqlx(skip)]
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Capabilities linked directly to the role.
    #[sqlx(skip)]
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Role {
    /// Creates an active role without permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            active: true,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: Utc::now(),
            permissions: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Appends a permission edge.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Appends a direct capability edge.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Finds a linked permission by exact name, first match wins.
    pub fn permission_named(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }

    /// Mutable variant of [`Role::permission_named`].
    pub fn permission_named_mut(&mut self, name: &str) -> Option<&mut Permission> {
        self.permissions.iter_mut().find(|p| p.name == name)
    }
}
