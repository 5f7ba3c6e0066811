//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Which credential/role store implementation backs the session flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; state is lost on exit.
    Memory,
    /// PostgreSQL through the `warden-database` repositories.
    #[default]
    Postgres,
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of `auth` tokens in minutes.
    #[serde(default = "default_auth_ttl")]
    pub auth_token_ttl_minutes: u64,
    /// Lifetime of `refresh` tokens in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn strength score (0-4). `0` disables the entropy check.
    #[serde(default)]
    pub password_min_strength: u8,
    /// Credential store backend.
    #[serde(default)]
    pub store: StoreBackend,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_token_ttl_minutes: default_auth_ttl(),
            refresh_token_ttl_hours: default_refresh_ttl(),
            password_min_length: default_password_min(),
            password_min_strength: 0,
            store: StoreBackend::default(),
        }
    }
}

fn default_auth_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    24 * 7
}

fn default_password_min() -> usize {
    8
}
