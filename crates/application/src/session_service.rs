//! Session issuance.
//!
//! A session carries a permission snapshot fixed at issuance. It gates UI
//! only; revocations reach it on the next login or refresh.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use portico_core::{AppError, AppResult, UserIdentity};
use portico_domain::{
    EffectivePermissions, EmailAddress, PermissionName, Section, UserId, visible_sections,
};
use serde::{Deserialize, Serialize};
use tracing::info;


use crate::AuthorizationService;

/// Login credentials of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// Unique user identifier.
    pub user_id: UserId,
    /// Argon2id password hash, or `None` for invited users without a password.
    pub password_hash: Option<String>,
}

/// Repository port for credential lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds credentials by canonical email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Permission entry embedded in a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPermission {
    /// Dotted permission name.
    pub name: PermissionName,
    /// Human-readable label.
    pub display_name: String,
}

/// Resolved-permission snapshot stored in the session at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Authenticated user.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Legacy role label, informational only.
    pub role: Option<String>,
    /// Whether the super-administrator bypass applied at issuance.
    pub is_super_admin: bool,
    /// Permissions held at issuance, sorted by name.
    pub permissions: Vec<SessionPermission>,
}

impl SessionSnapshot {
    /// Returns the identity part of the snapshot.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.user_id.as_uuid(),
            self.display_name.clone(),
            self.email.clone(),
        )
    }

    /// Rebuilds the permission set captured at issuance.
    #[must_use]
    pub fn effective_permissions(&self) -> EffectivePermissions {
        EffectivePermissions::from_parts(
            self.is_super_admin,
            self.permissions
                .iter()
                .map(|permission| permission.name.clone())
                .collect::<BTreeSet<_>>(),
        )
    }

    /// Derives navigation from the snapshot.
    #[must_use]
    pub fn visible_sections(&self) -> Vec<Section> {
        visible_sections(&self.effective_permissions())
    }
}

/// Application service issuing session snapshots.
#[derive(Clone)]
pub struct SessionService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl SessionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            authorization_service,
            user_repository,
            password_hasher,
        }
    }

    /// Verifies credentials and issues a snapshot.
    ///
    /// Returns `None` for any failure (unknown email, wrong password, account
    /// without password) so callers cannot tell them apart.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<Option<SessionSnapshot>> {
        let Ok(email) = EmailAddress::new(email) else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        let credentials = self
            .user_repository
            .find_credentials_by_email(&email)
            .await?;

        let Some(credentials) = credentials else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        let Some(stored_hash) = credentials.password_hash.as_deref() else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        if !self.password_hasher.verify_password(password, stored_hash)? {
            return Ok(None);
        }

        self.issue_snapshot(credentials.user_id).await.map(Some)
    }

    /// Resolves the user's permissions and freezes them into a snapshot.
    pub async fn issue_snapshot(&self, user_id: UserId) -> AppResult<SessionSnapshot> {
        let user = self
            .authorization_service
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        let effective = self
            .authorization_service
            .resolve_effective_permissions(user_id)
            .await?;

        let display_names: BTreeMap<PermissionName, String> = self
            .authorization_service
            .permission_catalog()
            .await?
            .into_iter()
            .map(|definition| (definition.name, definition.display_name))
            .collect();

        let is_super_admin = effective.is_super_admin();
        let permissions: Vec<SessionPermission> = effective
            .into_names()
            .into_iter()
            .map(|name| SessionPermission {
                display_name: display_names
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string()),
                name,
            })
            .collect();

        info!(
            %user_id,
            permissions = permissions.len(),
            is_super_admin,
            "session snapshot issued"
        );

        Ok(SessionSnapshot {
            user_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role_label,
            is_super_admin,
            permissions,
        })
    }
}
