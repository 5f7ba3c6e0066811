//! Application configuration schemas.
//!
//! The configuration is built exactly once at process start, from a TOML
//! file, an optional environment overlay, and `WARDEN__*` environment
//! variables, and then passed by reference to the components that need
//! it. Nothing here is global or mutable after load.

pub mod auth;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::auth::{AuthConfig, StoreBackend};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `path` with the `config/{env}` overlay (both optional) and
    /// environment variables prefixed with `WARDEN__`, e.g.
    /// `WARDEN__AUTH__AUTH_TOKEN_TTL_MINUTES=30`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
