//! Capability entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::CapabilityId;

/// The finest-grained checkable unit of permitted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Capability {
    /// Unique capability identifier.
    pub id: CapabilityId,
    /// Canonical capability name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Inactive capabilities never grant access.
    pub active: bool,
}

impl Capability {
    /// Creates an active capability with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CapabilityId::new(),
            name: name.into(),
            description: None,
            active: true,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
