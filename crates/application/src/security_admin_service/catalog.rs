use portico_domain::{PermissionDefinition, PermissionName, RoleDefinition, RoleId, well_known};
use tracing::info;

use crate::{CreatePermissionInput, CreateRoleInput};

use super::*;

impl SecurityAdminService {
    /// Returns every role with its grants.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<RoleDefinition>> {
        self.require(actor, well_known::ROLES_VIEW).await?;
        self.repository.list_roles().await
    }

    /// Creates a role and emits an audit event.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let role = self.repository.create_role(input).await?;
        info!(role = %role.name, grants = role.permissions.len(), "role created");

        self.audit(
            actor_id,
            AuditAction::RoleCreated,
            "rbac_role",
            role.role_id.to_string(),
            format!("created role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a role and emits an audit event.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<()> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let role = self.repository.delete_role(role_id).await?;
        info!(role = %role.name, "role deleted");

        self.audit(
            actor_id,
            AuditAction::RoleDeleted,
            "rbac_role",
            role_id.to_string(),
            format!("deleted role '{}'", role.name),
        )
        .await
    }

    /// Replaces every grant of a role and emits an audit event.
    pub async fn replace_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        permissions: Vec<PermissionName>,
    ) -> AppResult<RoleDefinition> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let role = self
            .repository
            .replace_role_permissions(role_id, permissions)
            .await?;

        self.audit(
            actor_id,
            AuditAction::RolePermissionsReplaced,
            "rbac_role",
            role_id.to_string(),
            format!(
                "role '{}' now grants {} permissions",
                role.name,
                role.permissions.len()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Returns the permission catalog.
    pub async fn list_permissions(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.require(actor, well_known::ROLES_VIEW).await?;
        self.repository.list_permissions().await
    }

    /// Adds a permission to the catalog and emits an audit event.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let permission = self.repository.create_permission(input).await?;
        self.audit(
            actor_id,
            AuditAction::PermissionCreated,
            "rbac_permission",
            permission.name.to_string(),
            format!("created permission '{}'", permission.name),
        )
        .await?;

        Ok(permission)
    }

    /// Removes a permission and all of its grants.
    pub async fn retire_permission(
        &self,
        actor: &UserIdentity,
        permission: &PermissionName,
    ) -> AppResult<()> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        self.repository.retire_permission(permission).await?;
        info!(%permission, "permission retired");

        self.audit(
            actor_id,
            AuditAction::PermissionRetired,
            "rbac_permission",
            permission.to_string(),
            format!("retired permission '{permission}'"),
        )
        .await
    }

    /// Moves every grant of a permission to a newly created one.
    ///
    /// Names are immutable, so this is the only way to rename a permission.
    pub async fn replace_permission(
        &self,
        actor: &UserIdentity,
        permission: &PermissionName,
        replacement: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let created = self
            .repository
            .replace_permission(permission, replacement)
            .await?;
        info!(from = %permission, to = %created.name, "permission replaced");

        self.audit(
            actor_id,
            AuditAction::PermissionReplaced,
            "rbac_permission",
            created.name.to_string(),
            format!(
                "moved grants of '{permission}' to '{}' and retired the old name",
                created.name
            ),
        )
        .await?;

        Ok(created)
    }
}
