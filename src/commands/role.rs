//! Role graph CLI commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use warden_auth::Requirement;
use warden_auth::store::{CredentialStore, RoleStore};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_entity::identity::LoginIdentifier;
use warden_entity::role::{Capability, Permission, Role};

use crate::output::{self, OutputFormat};

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Graph node whose active flag is changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Node {
    /// A role
    Role,
    /// A permission, everywhere it is linked
    Permission,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Create a role
    Create {
        /// Role name
        name: String,
        /// Permissions to link, in order
        #[arg(short, long = "permission")]
        permissions: Vec<String>,
        /// Capabilities to link directly to the role
        #[arg(short, long = "capability")]
        capabilities: Vec<String>,
    },
    /// Link a permission to an existing role
    Grant {
        /// Role name
        role: String,
        /// Permission name
        permission: String,
        /// Capabilities reachable through the permission
        #[arg(short, long = "capability")]
        capabilities: Vec<String>,
    },
    /// Assign a role to an identity
    Assign {
        /// Role name
        role: String,
        /// Email or user name of the identity
        identifier: String,
    },
    /// Activate or deactivate a role or permission
    SetActive {
        /// Node kind
        #[arg(value_enum)]
        node: Node,
        /// Node name
        name: String,
        /// New active flag
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Check whether an identity satisfies a requirement
    Check {
        /// Email or user name of the identity
        identifier: String,
        /// `permission:<name>`, `capability:<name>`, or a bare permission name
        requirement: String,
    },
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: String,
    /// Name
    name: String,
    /// Status
    status: String,
    /// Permissions
    permissions: String,
    /// Capabilities
    capabilities: String,
}

impl From<&Role> for RoleRow {
    fn from(role: &Role) -> Self {
        let permissions = role
            .permissions
            .iter()
            .map(|p| {
                if p.active {
                    p.name.clone()
                } else {
                    format!("{} (inactive)", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let capabilities = role
            .capabilities
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: role.id.to_string(),
            name: role.name.clone(),
            status: if role.active { "active" } else { "inactive" }.to_string(),
            permissions,
            capabilities,
        }
    }
}

/// Execute role commands
pub async fn execute(
    args: &RoleArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let flow = super::build_flow(config).await?;
    let roles = flow.roles();

    match &args.command {
        RoleCommand::Create {
            name,
            permissions,
            capabilities,
        } => {
            let role = permissions
                .iter()
                .fold(Role::new(name.trim()), |role, p| {
                    role.with_permission(Permission::new(p.trim()))
                });
            let role = capabilities
                .iter()
                .fold(role, |role, c| role.with_capability(Capability::new(c.trim())));
            let role = roles.save_role(role).await?;
            output::print_item(&RoleRow::from(&role), format);
        }
        RoleCommand::Grant {
            role,
            permission,
            capabilities,
        } => {
            let target = find_role(&flow, role).await?;
            let permission = capabilities
                .iter()
                .fold(Permission::new(permission.trim()), |p, c| {
                    p.with_capability(Capability::new(c.trim()))
                });
            let name = permission.name.clone();
            roles.grant_permission(target.id, permission).await?;
            output::print_success(&format!("Granted '{name}' to role '{}'", target.name));
        }
        RoleCommand::Assign { role, identifier } => {
            let target = find_role(&flow, role).await?;
            let identity = flow
                .credentials()
                .find_identity_by_login(&LoginIdentifier::parse(identifier))
                .await?
                .ok_or_else(|| AppError::not_found(format!("Identity '{identifier}' not found")))?;
            roles.assign_role(identity.id, target.id).await?;
            output::print_success(&format!(
                "Assigned role '{}' to '{}'",
                target.name, identity.user_name
            ));
        }
        RoleCommand::SetActive { node, name, active } => {
            let changed = match node {
                Node::Role => roles.set_role_active(name, *active).await?,
                Node::Permission => roles.set_permission_active(name, *active).await?,
            };
            if !changed {
                return Err(AppError::not_found(format!("{node:?} '{name}' not found")));
            }
            let state = if *active { "activated" } else { "deactivated" };
            output::print_success(&format!("{node:?} '{name}' {state}"));
        }
        RoleCommand::Check {
            identifier,
            requirement,
        } => {
            let requirement: Requirement = requirement.parse()?;
            let identity = flow
                .credentials()
                .find_identity_by_login(&LoginIdentifier::parse(identifier))
                .await?
                .ok_or_else(|| AppError::not_found(format!("Identity '{identifier}' not found")))?;
            if flow.authorize(&identity, &requirement).await? {
                output::print_success(&format!("'{}' has {requirement}", identity.user_name));
            } else {
                output::print_warning(&format!("'{}' lacks {requirement}", identity.user_name));
                let held = flow.roles_of(&identity).await?;
                let rows: Vec<RoleRow> = held.iter().map(RoleRow::from).collect();
                output::print_list(&rows, format);
            }
        }
    }

    Ok(())
}

async fn find_role(flow: &warden_auth::IdentitySessionFlow, name: &str) -> Result<Role, AppError> {
    flow.roles()
        .find_role(name.trim())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role '{}' not found", name.trim())))
}
