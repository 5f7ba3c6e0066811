//! Role-based access control over the role → permission → capability graph.

pub mod enforcer;
pub mod graph;
pub mod requirement;

pub use enforcer::RbacEnforcer;
pub use graph::AuthorizationGraph;
pub use requirement::Requirement;
