use std::fmt::{Display, Formatter};
use std::str::FromStr;

use portico_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PermissionName;

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role identity without its grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleSummary {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
}

/// Role catalog entry with its permission grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Free-text description.
    pub description: String,
    /// Built-in roles cannot be deleted while assigned.
    pub is_system: bool,
    /// Role grants sorted by name.
    pub permissions: Vec<PermissionName>,
}

impl RoleDefinition {
    /// Returns the identity part of the definition.
    #[must_use]
    pub fn summary(&self) -> RoleSummary {
        RoleSummary {
            role_id: self.role_id,
            name: self.name.clone(),
        }
    }
}

/// How a role assignment treats the user's existing roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Drop every existing role and make the new one primary.
    Replace,
    /// Keep existing roles; the new one becomes primary only if none is set.
    Add,
}

impl AssignmentMode {
    /// Returns a stable transport value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Add => "add",
        }
    }
}

impl FromStr for AssignmentMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "replace" => Ok(Self::Replace),
            "add" => Ok(Self::Add),
            _ => Err(AppError::Validation(format!(
                "assignment mode must be 'replace' or 'add', got '{value}'"
            ))),
        }
    }
}
