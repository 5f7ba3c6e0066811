//! Identity CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use warden_auth::store::CredentialStore;
use warden_auth::{RegisterRequest, Token};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_entity::identity::{Identity, LoginIdentifier};
use warden_entity::token::TokenType;

use crate::output::{self, OutputFormat};

/// Arguments for identity commands
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Identity subcommand
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands
#[derive(Debug, Subcommand)]
pub enum IdentityCommand {
    /// Register a new identity
    Register {
        /// Email address
        #[arg(long)]
        email: String,
        /// User name
        #[arg(long)]
        user_name: String,
        /// Given name
        #[arg(long)]
        first_name: Option<String>,
        /// Family name
        #[arg(long)]
        last_name: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and print the issued token
    Login {
        /// Email or user name
        identifier: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Also issue a refresh token
        #[arg(long)]
        refresh: bool,
    },
    /// Show the identity and permissions behind an auth token
    Whoami {
        /// Auth token
        #[arg(long)]
        token: String,
    },
    /// Exchange a refresh token for a new token pair
    Refresh {
        /// Refresh token
        #[arg(long)]
        token: String,
    },
    /// Revoke every token of the identity behind an auth token
    Logout {
        /// Auth token
        #[arg(long)]
        token: String,
    },
    /// Change the password of the identity behind an auth token
    Passwd {
        /// Auth token
        #[arg(long)]
        token: String,
        /// Current password (prompted when omitted)
        #[arg(long)]
        current: Option<String>,
        /// New password (prompted when omitted)
        #[arg(long)]
        new: Option<String>,
    },
    /// Activate or deactivate an identity
    SetActive {
        /// Email or user name
        identifier: String,
        /// New active flag
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
}

/// Identity display row for table output
#[derive(Debug, Serialize, Tabled)]
struct IdentityRow {
    /// Identity ID
    id: String,
    /// Email
    email: String,
    /// User name
    user_name: String,
    /// Full name
    name: String,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

impl From<&Identity> for IdentityRow {
    fn from(identity: &Identity) -> Self {
        let name = [identity.first_name.as_deref(), identity.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: identity.id.to_string(),
            email: identity.email.clone(),
            user_name: identity.user_name.clone(),
            name,
            status: if identity.active { "active" } else { "inactive" }.to_string(),
            created_at: identity.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Token display row for table output
#[derive(Debug, Serialize, Tabled)]
struct TokenRow {
    /// Token type
    token_type: String,
    /// Opaque value
    token: String,
    /// Expires at
    expires_at: String,
}

impl From<&Token> for TokenRow {
    fn from(token: &Token) -> Self {
        Self {
            token_type: token.token_type.to_string(),
            token: token.opaque_value.clone(),
            expires_at: token.expires_at.to_rfc3339(),
        }
    }
}

/// Execute identity commands
pub async fn execute(
    args: &IdentityArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let flow = super::build_flow(config).await?;

    match &args.command {
        IdentityCommand::Register {
            email,
            user_name,
            first_name,
            last_name,
            password,
        } => {
            let password = super::secret_or_prompt(password.as_deref(), "Password")?;
            let request = RegisterRequest::new(email, user_name, password)
                .with_names(first_name.clone(), last_name.clone());
            let identity = flow.register(request).await?;
            output::print_item(&IdentityRow::from(&identity), format);
            output::print_success(&format!("Identity '{}' registered", identity.user_name));
        }
        IdentityCommand::Login {
            identifier,
            password,
            refresh,
        } => {
            let password = super::secret_or_prompt(password.as_deref(), "Password")?;
            let rows: Vec<TokenRow> = if *refresh {
                let pair = flow.login_with_refresh(identifier, &password).await?;
                vec![TokenRow::from(&pair.auth), TokenRow::from(&pair.refresh)]
            } else {
                let token = flow.login(identifier, &password).await?;
                vec![TokenRow::from(&token)]
            };
            output::print_list(&rows, format);
        }
        IdentityCommand::Whoami { token } => {
            let identity = flow.authenticate(token, TokenType::Auth).await?;
            let permissions = flow.permissions_of(&identity).await?;
            output::print_item(&IdentityRow::from(&identity), format);
            let granted = permissions.into_iter().collect::<Vec<_>>().join(", ");
            output::print_kv("Permissions", &granted);
        }
        IdentityCommand::Refresh { token } => {
            let pair = flow.refresh(token).await?;
            let rows = vec![TokenRow::from(&pair.auth), TokenRow::from(&pair.refresh)];
            output::print_list(&rows, format);
        }
        IdentityCommand::Logout { token } => {
            let identity = flow.authenticate(token, TokenType::Auth).await?;
            flow.logout(identity.id).await?;
            output::print_success(&format!("Logged out '{}'", identity.user_name));
        }
        IdentityCommand::Passwd {
            token,
            current,
            new,
        } => {
            let identity = flow.authenticate(token, TokenType::Auth).await?;
            let current = super::secret_or_prompt(current.as_deref(), "Current password")?;
            let new = super::secret_or_prompt(new.as_deref(), "New password")?;
            flow.change_password(identity.id, &current, &new).await?;
            output::print_success("Password changed; all tokens revoked");
        }
        IdentityCommand::SetActive { identifier, active } => {
            let identity = flow
                .credentials()
                .find_identity_by_login(&LoginIdentifier::parse(identifier))
                .await?
                .ok_or_else(|| AppError::not_found(format!("Identity '{identifier}' not found")))?;
            flow.credentials()
                .set_identity_active(identity.id, *active)
                .await?;
            if !*active {
                flow.logout(identity.id).await?;
            }
            let state = if *active { "activated" } else { "deactivated" };
            output::print_success(&format!("Identity '{}' {state}", identity.user_name));
        }
    }

    Ok(())
}
