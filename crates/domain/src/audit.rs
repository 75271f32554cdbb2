use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by administrative use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a role's grants are replaced.
    RolePermissionsReplaced,
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role is removed from a user.
    RoleRevoked,
    /// Emitted when a permission is added to the catalog.
    PermissionCreated,
    /// Emitted when a permission is removed from the catalog.
    PermissionRetired,
    /// Emitted when a permission's grants move to a new name.
    PermissionReplaced,
    /// Emitted when an explicit grant or deny override is written.
    UserPermissionOverridden,
    /// Emitted when an override row is deleted.
    UserPermissionCleared,
    /// Emitted when role grants are materialized for a user.
    UserPermissionsSynced,
    /// Emitted when a consistency repair changes stored rows.
    ConsistencyRepaired,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "security.role.created",
            Self::RoleDeleted => "security.role.deleted",
            Self::RolePermissionsReplaced => "security.role.permissions_replaced",
            Self::RoleAssigned => "security.role.assigned",
            Self::RoleRevoked => "security.role.revoked",
            Self::PermissionCreated => "security.permission.created",
            Self::PermissionRetired => "security.permission.retired",
            Self::PermissionReplaced => "security.permission.replaced",
            Self::UserPermissionOverridden => "security.user_permission.overridden",
            Self::UserPermissionCleared => "security.user_permission.cleared",
            Self::UserPermissionsSynced => "security.user_permission.synced",
            Self::ConsistencyRepaired => "security.consistency.repaired",
        }
    }
}
