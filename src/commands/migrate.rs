//! Database migration commands.

use clap::{Args, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run,
    /// Check connectivity and list pending migrations
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            let applied = db.migrate().await?;
            output::print_success(&format!("Applied {applied} migration(s)."));
        }
        MigrateCommand::Check => {
            db.health_check().await?;
            output::print_success("Database is reachable.");
            let pending = db.pending_migrations().await?;
            if pending.is_empty() {
                output::print_success("Schema is up to date.");
            } else {
                output::print_warning(&format!("{} pending migration(s):", pending.len()));
                for migration in &pending {
                    println!("  {migration}");
                }
            }
        }
    }

    db.pool().close().await;
    Ok(())
}
