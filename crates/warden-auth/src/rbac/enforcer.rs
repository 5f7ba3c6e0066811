//! RBAC enforcement: turns graph answers into `Authorization` errors.

use warden_core::error::AppError;
use warden_entity::role::Role;

use super::graph::AuthorizationGraph;
use super::requirement::Requirement;

/// Enforces requirements against an identity's roles.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    graph: AuthorizationGraph,
}

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying graph evaluator.
    pub fn graph(&self) -> &AuthorizationGraph {
        &self.graph
    }

    /// Checks `requirement` against `roles`.
    ///
    /// Returns `Ok(())` if granted, or an `Authorization` error naming the
    /// missing grant.
    pub fn require(&self, roles: &[Role], requirement: &Requirement) -> Result<(), AppError> {
        if self.graph.permits(roles, requirement) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Missing {} '{}'",
                requirement.kind(),
                requirement.name()
            )))
        }
    }

    /// Requires the permission `name`.
    pub fn require_permission(&self, roles: &[Role], name: &str) -> Result<(), AppError> {
        self.require(roles, &Requirement::permission(name))
    }

    /// Requires the capability `name`.
    pub fn require_capability(&self, roles: &[Role], name: &str) -> Result<(), AppError> {
        self.require(roles, &Requirement::capability(name))
    }
}
