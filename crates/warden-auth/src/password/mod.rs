//! Secret hashing, verification, and password policy.

pub mod digest;
pub mod validator;

pub use digest::{HashEngine, generate_salt};
pub use validator::PasswordValidator;
