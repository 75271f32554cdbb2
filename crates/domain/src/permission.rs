use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use portico_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Permission names referenced directly by application policy checks.
pub mod well_known {
    /// Allows listing roles and the permission catalog.
    pub const ROLES_VIEW: &str = "roles.view";
    /// Allows creating, editing, assigning and deleting roles.
    pub const ROLES_MANAGE: &str = "roles.manage";
    /// Allows listing users and their grants.
    pub const USERS_VIEW: &str = "users.view";
    /// Allows editing per-user permission overrides.
    pub const USERS_MANAGE: &str = "users.manage";
    /// Allows changing system settings and running consistency repairs.
    pub const SETTINGS_EDIT: &str = "settings.edit";
}

/// Unique identifier for a permission catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
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

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Dot-delimited permission code such as `content.view` or `jobs.create`.
///
/// The first segment is the module, the remaining segments form the action.
/// Every segment starts with a lowercase ASCII letter and contains only
/// lowercase letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a validated permission name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        let segments: Vec<&str> = trimmed.split('.').collect();
        if segments.len() < 2 {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' must have the form 'module.action'"
            )));
        }

        for segment in &segments {
            if !is_valid_segment(segment) {
                return Err(AppError::Validation(format!(
                    "permission name '{trimmed}' has an invalid segment '{segment}'"
                )));
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the full dotted name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the module segment.
    #[must_use]
    pub fn module(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// Returns everything after the module segment.
    #[must_use]
    pub fn action(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(_, action)| action)
            .unwrap_or_default()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_lowercase()
        && chars.all(|value| value.is_ascii_lowercase() || value.is_ascii_digit() || value == '_')
}

impl FromStr for PermissionName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

/// Ordering and hashing match the inner `str`, so sets accept `&str` lookups.
impl Borrow<str> for PermissionName {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Permission catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDefinition {
    /// Stable permission identifier.
    pub permission_id: PermissionId,
    /// Unique, immutable dotted name.
    pub name: PermissionName,
    /// Human-readable label.
    pub display_name: String,
    /// Module tag used for grouping in listings.
    pub module: String,
}

/// Origin of a direct user permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// Written by an administrator; takes part in resolution.
    Explicit,
    /// Copied from a role by grant synchronization; listing only.
    Synced,
}

impl GrantSource {
    /// Returns a stable storage value for this source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Synced => "synced",
        }
    }
}

impl FromStr for GrantSource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "explicit" => Ok(Self::Explicit),
            "synced" => Ok(Self::Synced),
            _ => Err(AppError::Validation(format!(
                "unknown grant source value '{value}'"
            ))),
        }
    }
}

/// Direct user permission edge from the overlay table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectGrant {
    /// User the edge belongs to.
    pub user_id: UserId,
    /// Permission the edge targets.
    pub permission: PermissionName,
    /// `true` adds the permission, `false` removes it.
    pub granted: bool,
    /// Who wrote the row.
    pub source: GrantSource,
}

impl DirectGrant {
    /// Returns whether this row is an administrator override.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.source == GrantSource::Explicit
    }
}
