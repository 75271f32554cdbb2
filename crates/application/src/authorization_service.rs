//! Permission resolution.
//!
//! Computes the effective permission set of a user from role edges and the
//! direct grant overlay. This is the only authorization path: session
//! snapshots gate UI only, and every sensitive request re-checks here.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use portico_core::AppResult;
use portico_domain::{
    DirectGrant, PermissionDefinition, PermissionName, RoleId, RoleSummary, UserAccount, UserId,
};

mod permissions;
mod sections;

#[cfg(test)]
mod tests;

/// Role name that bypasses resolution when no other configuration is given.
pub const DEFAULT_SUPER_ADMIN_ROLE: &str = "super_admin";

/// Repository port for the read side of permission resolution.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Lists roles linked to the user through assignment edges.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleSummary>>;

    /// Lists distinct permissions granted by any of the roles.
    async fn list_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<PermissionName>>;

    /// Lists every overlay row of the user.
    async fn list_direct_grants(&self, user_id: UserId) -> AppResult<Vec<DirectGrant>>;

    /// Finds the overlay row of the user for one permission.
    async fn find_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<Option<DirectGrant>>;

    /// Returns whether any of the roles grants the permission.
    async fn roles_grant_permission(
        &self,
        role_ids: &[RoleId],
        permission: &PermissionName,
    ) -> AppResult<bool>;

    /// Lists the whole permission catalog.
    async fn list_permission_catalog(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Returns whether the permission exists in the catalog.
    async fn permission_exists(&self, permission: &PermissionName) -> AppResult<bool>;
}

/// Configuration-time authorization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    super_admin_roles: BTreeSet<String>,
}

impl AuthorizationPolicy {
    /// Creates a policy from the role names that bypass resolution.
    #[must_use]
    pub fn new<I, S>(super_admin_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            super_admin_roles: super_admin_roles
                .into_iter()
                .map(Into::into)
                .map(|name: String| name.trim().to_owned())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Returns whether the role name is a super-administrator role.
    #[must_use]
    pub fn is_super_admin_role(&self, role_name: &str) -> bool {
        self.super_admin_roles.contains(role_name)
    }

    /// Returns whether any of the roles is a super-administrator role.
    #[must_use]
    pub fn grants_bypass(&self, roles: &[RoleSummary]) -> bool {
        roles
            .iter()
            .any(|role| self.is_super_admin_role(role.name.as_str()))
    }

    /// Returns the configured super-administrator role names.
    pub fn super_admin_roles(&self) -> impl Iterator<Item = &str> {
        self.super_admin_roles.iter().map(String::as_str)
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::new([DEFAULT_SUPER_ADMIN_ROLE])
    }
}

/// Application service for permission resolution and checks.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    policy: Arc<AuthorizationPolicy>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>, policy: AuthorizationPolicy) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> &AuthorizationPolicy {
        self.policy.as_ref()
    }

    /// Lists the permission catalog.
    pub async fn permission_catalog(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.repository.list_permission_catalog().await
    }

    /// Lists the overlay rows of a user.
    pub async fn direct_grants(&self, user_id: UserId) -> AppResult<Vec<DirectGrant>> {
        self.repository.list_direct_grants(user_id).await
    }

    /// Finds a user by identifier.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        self.repository.find_user(user_id).await
    }

    /// Returns the permissions reachable from the user's role edges alone.
    pub async fn role_reachable_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<BTreeSet<PermissionName>> {
        let roles = self.repository.list_roles_for_user(user_id).await?;
        if roles.is_empty() {
            return Ok(BTreeSet::new());
        }

        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.role_id).collect();
        Ok(self
            .repository
            .list_permissions_for_roles(&role_ids)
            .await?
            .into_iter()
            .collect())
    }
}
