//! Authorization graph nodes: roles, permissions, and capabilities.

pub mod capability;
pub mod model;
pub mod permission;

pub use capability::Capability;
pub use model::Role;
pub use permission::Permission;
