//! Token record maintenance commands.

use std::time::Duration;

use clap::{Args, Subcommand};

use warden_auth::TokenCleanup;
use warden_core::config::AppConfig;
use warden_core::error::AppError;

use crate::output;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Delete expired and revoked token records
    Purge {
        /// Keep running, purging every N seconds until interrupted
        #[arg(long, value_name = "SECONDS")]
        every: Option<u64>,
    },
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    let flow = super::build_flow(config).await?;
    let cleanup = TokenCleanup::new(flow.credentials().clone());

    match &args.command {
        TokenCommand::Purge { every: None } => {
            let removed = cleanup.run_cleanup().await?;
            output::print_success(&format!("Removed {removed} token record(s)."));
        }
        TokenCommand::Purge {
            every: Some(seconds),
        } => {
            let period = Duration::from_secs((*seconds).max(1));
            let task = cleanup.spawn(period);
            output::print_success(&format!(
                "Purging token records every {}s; press Ctrl-C to stop.",
                period.as_secs()
            ));
            let interrupted = tokio::signal::ctrl_c().await;
            task.abort();
            interrupted.map_err(|e| AppError::internal(format!("Signal error: {e}")))?;
        }
    }

    Ok(())
}
