use std::collections::BTreeSet;

use portico_core::AppError;
use portico_domain::EffectivePermissions;
use tracing::{debug, warn};

use super::*;

impl AuthorizationService {
    /// Resolves the effective permission set of a user.
    ///
    /// Unknown users resolve to the empty set. Super-administrators resolve
    /// to the entire catalog without consulting role grants or overrides.
    pub async fn resolve_effective_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<EffectivePermissions> {
        if self.repository.find_user(user_id).await?.is_none() {
            debug!(%user_id, "resolving permissions for unknown user");
            return Ok(EffectivePermissions::empty());
        }

        let roles = self.repository.list_roles_for_user(user_id).await?;
        let catalog: BTreeSet<PermissionName> = self
            .repository
            .list_permission_catalog()
            .await?
            .into_iter()
            .map(|definition| definition.name)
            .collect();

        if self.policy.grants_bypass(&roles) {
            return Ok(EffectivePermissions::super_admin(&catalog));
        }

        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.role_id).collect();
        let role_grants = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.repository.list_permissions_for_roles(&role_ids).await?
        };
        let overrides = self.repository.list_direct_grants(user_id).await?;

        Ok(EffectivePermissions::compute(
            &catalog,
            role_grants,
            &overrides,
        ))
    }

    /// Returns whether the user currently holds the permission.
    ///
    /// Checks the bypass first, then the user's explicit override, then any
    /// role edge, without materializing the full set.
    pub async fn has_permission(&self, user_id: UserId, permission: &str) -> AppResult<bool> {
        let Ok(permission) = PermissionName::new(permission) else {
            return Ok(false);
        };

        if self.repository.find_user(user_id).await?.is_none() {
            return Ok(false);
        }

        if !self.repository.permission_exists(&permission).await? {
            return Ok(false);
        }

        let roles = self.repository.list_roles_for_user(user_id).await?;
        if self.policy.grants_bypass(&roles) {
            return Ok(true);
        }

        if let Some(grant) = self
            .repository
            .find_direct_grant(user_id, &permission)
            .await?
            && grant.is_explicit()
        {
            return Ok(grant.granted);
        }

        if roles.is_empty() {
            return Ok(false);
        }

        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.role_id).collect();
        self.repository
            .roles_grant_permission(&role_ids, &permission)
            .await
    }

    /// Ensures the user holds the permission.
    ///
    /// The returned error never names the missing permission.
    pub async fn require_permission(&self, user_id: UserId, permission: &str) -> AppResult<()> {
        if self.has_permission(user_id, permission).await? {
            return Ok(());
        }

        warn!(%user_id, permission, "permission check denied");
        Err(AppError::Forbidden("insufficient permissions".to_owned()))
    }
}
