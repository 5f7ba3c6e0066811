//! Membership queries over role snapshots.
//!
//! Every hop is gated by its node's `active` flag: an inactive role
//! grants nothing, an inactive permission blocks itself and the
//! capabilities reached through it, and an inactive capability is never
//! granted. A blocked path never hides another path to the same grant.
//! Roles are flat; there is no inheritance between roles.

use std::collections::BTreeSet;

use warden_entity::role::{Capability, Permission, Role};

use super::requirement::Requirement;

/// Pure traversal of the authorization graph. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGraph;

impl AuthorizationGraph {
    /// Creates a graph evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether `role` grants the permission `name`.
    pub fn has_permission(&self, role: &Role, name: &str) -> bool {
        active_permissions(role).any(|p| p.name == name)
    }

    /// Checks whether any of `roles` grants the permission `name`.
    pub fn has_any_permission(&self, roles: &[Role], name: &str) -> bool {
        roles.iter().any(|role| self.has_permission(role, name))
    }

    /// Checks whether `role` grants the capability `name`, directly or
    /// through one of its permissions.
    pub fn has_capability(&self, role: &Role, name: &str) -> bool {
        active_capabilities(role).any(|c| c.name == name)
    }

    /// Checks whether any of `roles` grants the capability `name`.
    pub fn has_any_capability(&self, roles: &[Role], name: &str) -> bool {
        roles.iter().any(|role| self.has_capability(role, name))
    }

    /// Checks a [`Requirement`] against `roles`.
    pub fn permits(&self, roles: &[Role], requirement: &Requirement) -> bool {
        match requirement {
            Requirement::Permission(name) => self.has_any_permission(roles, name),
            Requirement::Capability(name) => self.has_any_capability(roles, name),
        }
    }

    /// Names of every permission effectively granted by `roles`.
    pub fn permissions_of(&self, roles: &[Role]) -> BTreeSet<String> {
        roles
            .iter()
            .flat_map(active_permissions)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Names of every capability effectively granted by `roles`.
    pub fn capabilities_of(&self, roles: &[Role]) -> BTreeSet<String> {
        roles
            .iter()
            .flat_map(active_capabilities)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn active_permissions(role: &Role) -> impl Iterator<Item = &Permission> {
    role.permissions
        .iter()
        .filter(move |p| role.active && p.active)
}

fn active_capabilities(role: &Role) -> impl Iterator<Item = &Capability> {
    let via_permissions = active_permissions(role).flat_map(|p| p.capabilities.iter());
    let direct = role.capabilities.iter().filter(move |_| role.active);
    via_permissions.chain(direct).filter(|c| c.active)
}
