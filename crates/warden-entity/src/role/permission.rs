//! Permission entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::PermissionId;

use super::capability::Capability;

/// A named grant held by roles, optionally refined into capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: PermissionId,
    /// Canonical permission name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Inactive permissions never grant access, even when linked.
    pub active: bool,
    /// Capabilities reachable through this permission.
    #[sqlx(skip)]
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Permission {
    /// Creates an active permission with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PermissionId::new(),
            name: name.into(),
            description: None,
            active: true,
            capabilities: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a capability edge.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
