//! What an authorization check asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use warden_core::error::AppError;

/// A single grant an identity must hold.
///
/// Names are trimmed on construction and compared exactly afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Requirement {
    /// A permission linked to an active role.
    Permission(String),
    /// A capability reachable from an active role.
    Capability(String),
}

impl Requirement {
    /// Requires the permission `name`.
    pub fn permission(name: impl AsRef<str>) -> Self {
        Self::Permission(name.as_ref().trim().to_string())
    }

    /// Requires the capability `name`.
    pub fn capability(name: impl AsRef<str>) -> Self {
        Self::Capability(name.as_ref().trim().to_string())
    }

    /// The required grant's name.
    pub fn name(&self) -> &str {
        match self {
            Self::Permission(name) | Self::Capability(name) => name,
        }
    }

    /// `"permission"` or `"capability"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Permission(_) => "permission",
            Self::Capability(_) => "capability",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.name())
    }
}

/// Parses `permission:<name>` or `capability:<name>`. A bare name is a permission.
impl FromStr for Requirement {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requirement = match s.split_once(':') {
            Some((kind, name)) => match kind.trim().to_lowercase().as_str() {
                "permission" => Self::permission(name),
                "capability" => Self::capability(name),
                other => {
                    return Err(AppError::validation(format!(
                        "Invalid requirement kind: '{other}'. Expected permission or capability"
                    )));
                }
            },
            None => Self::permission(s),
        };

        if requirement.name().is_empty() {
            return Err(AppError::validation("Requirement name is required"));
        }
        Ok(requirement)
    }
}
