//! Shared value types.

pub mod id;

pub use id::{CapabilityId, IdentityId, PermissionId, RoleId};
