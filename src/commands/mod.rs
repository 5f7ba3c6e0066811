//! CLI command definitions and dispatch.

pub mod config;
pub mod identity;
pub mod migrate;
pub mod role;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use warden_auth::IdentitySessionFlow;
use warden_auth::store::{MemoryCredentialStore, MemoryRoleStore, PgCredentialStore, PgRoleStore};
use warden_core::config::{AppConfig, StoreBackend};
use warden_core::error::AppError;
use warden_database::DatabasePool;

use crate::output::{self, OutputFormat};

/// Warden: credential and access-control administration
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Identity registration, login, and sessions
    Identity(identity::IdentityArgs),
    /// Role graph administration and checks
    Role(role::RoleArgs),
    /// Token record maintenance
    Token(token::TokenArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Identity(args) => identity::execute(args, config, self.format).await,
            Commands::Role(args) => role::execute(args, config, self.format).await,
            Commands::Token(args) => token::execute(args, config).await,
            Commands::Config(args) => config::execute(args, &self.config, config, self.format),
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::open(&config.database).await
}

/// Helper: build the session flow over the configured store backend
pub async fn build_flow(config: &AppConfig) -> Result<IdentitySessionFlow, AppError> {
    let flow = match config.auth.store {
        StoreBackend::Memory => {
            output::print_warning("Using the in-memory store; state is discarded on exit.");
            IdentitySessionFlow::new(
                &config.auth,
                Arc::new(MemoryCredentialStore::new()),
                Arc::new(MemoryRoleStore::new()),
            )
        }
        StoreBackend::Postgres => {
            let pool = create_db_pool(config).await?;
            IdentitySessionFlow::new(
                &config.auth,
                Arc::new(PgCredentialStore::new(&pool)),
                Arc::new(PgRoleStore::new(&pool)),
            )
        }
    };
    Ok(flow)
}

/// Helper: read a secret from the argument or prompt for it without echo
pub fn secret_or_prompt(value: Option<&str>, prompt: &str) -> Result<String, AppError> {
    match value {
        Some(value) => Ok(value.to_string()),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}
