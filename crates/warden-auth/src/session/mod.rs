//! Identity lifecycle: registration, login, authentication, authorization.

pub mod cleanup;
pub mod flow;
pub mod request;

pub use cleanup::TokenCleanup;
pub use flow::IdentitySessionFlow;
pub use request::RegisterRequest;
