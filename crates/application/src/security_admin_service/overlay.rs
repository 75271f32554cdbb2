use portico_domain::{DirectGrant, EffectivePermissions, PermissionName, well_known};
use tracing::info;

use super::*;

impl SecurityAdminService {
    /// Grants a permission to a user regardless of their roles.
    pub async fn grant_permission(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<DirectGrant> {
        self.write_override(actor, user_id, permission, true).await
    }

    /// Denies a permission to a user even when a role grants it.
    pub async fn deny_permission(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<DirectGrant> {
        self.write_override(actor, user_id, permission, false).await
    }

    /// Deletes the overlay row of a user for one permission.
    pub async fn clear_override(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<()> {
        let actor_id = self.require(actor, well_known::USERS_MANAGE).await?;

        self.repository
            .delete_direct_grant(user_id, permission)
            .await?;
        info!(%user_id, %permission, "permission override cleared");

        self.audit(
            actor_id,
            AuditAction::UserPermissionCleared,
            "rbac_user_permission",
            format!("{user_id}:{permission}"),
            format!("cleared override '{permission}' of user '{user_id}'"),
        )
        .await
    }

    /// Lists the overlay rows of a user.
    pub async fn list_direct_grants(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<DirectGrant>> {
        self.require(actor, well_known::USERS_VIEW).await?;
        self.authorization_service.direct_grants(user_id).await
    }

    /// Resolves the effective permissions of another user.
    pub async fn effective_permissions_for(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<EffectivePermissions> {
        self.require(actor, well_known::USERS_VIEW).await?;
        self.authorization_service
            .resolve_effective_permissions(user_id)
            .await
    }

    async fn write_override(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission: &PermissionName,
        granted: bool,
    ) -> AppResult<DirectGrant> {
        let actor_id = self.require(actor, well_known::USERS_MANAGE).await?;

        let grant = self
            .repository
            .upsert_direct_grant(user_id, permission, granted)
            .await?;
        info!(%user_id, %permission, granted, "permission override written");

        let verb = if granted { "granted" } else { "denied" };
        self.audit(
            actor_id,
            AuditAction::UserPermissionOverridden,
            "rbac_user_permission",
            format!("{user_id}:{permission}"),
            format!("{verb} '{permission}' for user '{user_id}'"),
        )
        .await?;

        Ok(grant)
    }
}
