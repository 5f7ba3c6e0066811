//! Configuration CLI commands.

use clap::{Args, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_database::redact_url;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = redact_url(&shown.database.url);
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    println!("Configuration '{config_path}':");
                    output::print_kv("Database", &shown.database.url);
                    output::print_kv("Store", &format!("{:?}", shown.auth.store));
                    output::print_kv(
                        "Auth token TTL",
                        &format!("{} min", shown.auth.auth_token_ttl_minutes),
                    );
                    output::print_kv(
                        "Refresh token TTL",
                        &format!("{} h", shown.auth.refresh_token_ttl_hours),
                    );
                    output::print_kv(
                        "Password min length",
                        &shown.auth.password_min_length.to_string(),
                    );
                    output::print_kv(
                        "Password min strength",
                        &shown.auth.password_min_strength.to_string(),
                    );
                    output::print_kv(
                        "Logging",
                        &format!("{} ({})", shown.logging.level, shown.logging.format),
                    );
                }
            }
        }
    }

    Ok(())
}
