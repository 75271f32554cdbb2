use async_trait::async_trait;

use portico_core::AppResult;
use portico_domain::{
    AssignmentMode, DirectGrant, PermissionDefinition, PermissionName, RoleDefinition, RoleId,
    RoleSummary, UserId,
};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Free-text description.
    pub description: String,
    /// Grants to attach to the role.
    pub permissions: Vec<PermissionName>,
}

/// Input payload for adding a permission to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique dotted name; its first segment becomes the module tag.
    pub name: PermissionName,
    /// Human-readable label.
    pub display_name: String,
}

/// Input payload for role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// User receiving the role.
    pub user_id: UserId,
    /// Role to assign.
    pub role_id: RoleId,
    /// Replace or add semantics.
    pub mode: AssignmentMode,
}

/// Assignment projection mapping a user to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// User identifier.
    pub user_id: UserId,
    /// Role identifier.
    pub role_id: RoleId,
    /// Role name.
    pub role_name: String,
    /// Whether the legacy label mirrors this role.
    pub is_primary: bool,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}

/// Result of a role assignment or revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChangeOutcome {
    /// Role the change targeted.
    pub role: RoleSummary,
    /// Whether any assignment edge was written or removed.
    pub changed: bool,
    /// Primary role after the change; the legacy label equals its name.
    pub primary_role: Option<RoleSummary>,
    /// Materialized rows inserted by the trailing grant synchronization.
    pub synced_grants_inserted: u64,
    /// Materialized rows deleted because no remaining role grants them.
    pub stale_grants_removed: u64,
}

/// Repository port for role, catalog and overlay administration.
///
/// Every mutating method runs in one transaction.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Lists all roles with their grants, sorted by name.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Creates a role and attaches grants.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition>;

    /// Deletes a role; system roles still assigned are rejected with a conflict.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<RoleSummary>;

    /// Replaces every grant of a role.
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permissions: Vec<PermissionName>,
    ) -> AppResult<RoleDefinition>;

    /// Lists the permission catalog sorted by module and name.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Adds a permission to the catalog.
    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition>;

    /// Removes a permission and every grant that references it.
    async fn retire_permission(&self, permission: &PermissionName) -> AppResult<()>;

    /// Creates a new permission, moves every grant of the old one to it and
    /// retires the old one.
    async fn replace_permission(
        &self,
        permission: &PermissionName,
        replacement: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition>;

    /// Lists role assignments of one user.
    async fn list_role_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Assigns a role, rewrites the primary role and legacy label, prunes
    /// stale materialized rows and synchronizes role grants.
    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<RoleChangeOutcome>;

    /// Removes one role edge, rewrites the primary role and legacy label and
    /// prunes stale materialized rows.
    async fn revoke_role(&self, user_id: UserId, role_id: RoleId)
    -> AppResult<RoleChangeOutcome>;

    /// Materializes role-reachable permissions as synced overlay rows.
    ///
    /// Existing rows are left untouched. Returns the number of rows inserted.
    async fn sync_user_permissions(&self, user_id: UserId) -> AppResult<u64>;

    /// Writes an explicit override row.
    async fn upsert_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
        granted: bool,
    ) -> AppResult<DirectGrant>;

    /// Deletes the overlay row of a user for one permission.
    async fn delete_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<()>;
}
