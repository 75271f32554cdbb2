//! In-memory fakes for every application port.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use portico_core::{AppError, AppResult, UserIdentity};
use portico_domain::{
    DirectGrant, EmailAddress, GrantSource, PermissionDefinition, PermissionId, PermissionName,
    RoleDefinition, RoleId, RoleSummary, UserAccount, UserId, UserRoleState,
};
use tokio::sync::Mutex;

use crate::{
    AssignRoleInput, AuditEvent, AuditRepository, AuthorizationPolicy, AuthorizationRepository,
    AuthorizationService, ConsistencyRepository, CreatePermissionInput, CreateRoleInput,
    PasswordHasher, RoleAssignment, RoleChangeOutcome, SecurityAdminRepository, UserCredentials,
    UserRepair, UserRepository,
};
use portico_domain::AssignmentMode;

pub(crate) fn name(value: &str) -> PermissionName {
    PermissionName::new(value).unwrap_or_else(|error| panic!("{error}"))
}

pub(crate) fn identity(user_id: UserId) -> UserIdentity {
    UserIdentity::new(user_id.as_uuid(), "Test Actor", "actor@example.org")
}

pub(crate) const BLOGGER_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "content.view",
    "content.create",
    "content.edit",
    "content.publish",
    "jobs.view",
    "jobs.create",
    "jobs.edit",
    "jobs.publish",
    "scholarships.view",
    "scholarships.create",
    "scholarships.edit",
    "scholarships.publish",
    "newsletter.view",
    "newsletter.create",
];

pub(crate) const PORTAL_CATALOG: &[&str] = &[
    "dashboard.view",
    "content.view",
    "content.create",
    "content.edit",
    "content.publish",
    "content.delete",
    "jobs.view",
    "jobs.create",
    "jobs.edit",
    "jobs.publish",
    "scholarships.view",
    "scholarships.create",
    "scholarships.edit",
    "scholarships.publish",
    "newsletter.view",
    "newsletter.create",
    "newsletter.send",
    "services.view",
    "portfolio.view",
    "about.view",
    "team.view",
    "announcements.view",
    "organizations.view",
    "analytics.view",
    "tools.view",
    "users.view",
    "users.manage",
    "roles.view",
    "roles.manage",
    "settings.view",
    "settings.edit",
];

struct FakeUser {
    account: UserAccount,
    password_hash: Option<String>,
}

struct FakeRole {
    name: String,
    display_name: String,
    description: String,
    is_system: bool,
    permissions: BTreeSet<PermissionName>,
}

#[derive(Default)]
struct FakeState {
    users: BTreeMap<UserId, FakeUser>,
    roles: BTreeMap<RoleId, FakeRole>,
    permissions: BTreeMap<PermissionName, PermissionDefinition>,
    user_roles: Vec<(UserId, RoleId)>,
    user_permissions: BTreeMap<(UserId, PermissionName), (bool, GrantSource)>,
    audit_events: Vec<AuditEvent>,
    unavailable: bool,
}

impl FakeState {
    fn check_available(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::Unavailable("database pool exhausted".to_owned()));
        }
        Ok(())
    }

    fn role_summary(&self, role_id: RoleId) -> AppResult<RoleSummary> {
        self.roles
            .get(&role_id)
            .map(|role| RoleSummary {
                role_id,
                name: role.name.clone(),
            })
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn role_definition(&self, role_id: RoleId) -> AppResult<RoleDefinition> {
        let role = self
            .roles
            .get(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;
        Ok(RoleDefinition {
            role_id,
            name: role.name.clone(),
            display_name: role.display_name.clone(),
            description: role.description.clone(),
            is_system: role.is_system,
            permissions: role.permissions.iter().cloned().collect(),
        })
    }

    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("user '{user_id}' was not found")))
        }
    }

    fn require_permission(&self, permission: &PermissionName) -> AppResult<()> {
        if self.permissions.contains_key(permission) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "permission '{permission}' was not found"
            )))
        }
    }

    fn roles_of(&self, user_id: UserId) -> Vec<RoleId> {
        self.user_roles
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, role)| *role)
            .collect()
    }

    fn reachable(&self, user_id: UserId) -> BTreeSet<PermissionName> {
        self.roles_of(user_id)
            .iter()
            .filter_map(|role_id| self.roles.get(role_id))
            .flat_map(|role| role.permissions.iter().cloned())
            .collect()
    }

    fn write_primary(&mut self, user_id: UserId, primary: Option<RoleId>) {
        let label = primary
            .and_then(|role_id| self.roles.get(&role_id))
            .map(|role| role.name.clone());
        if let Some(user) = self.users.get_mut(&user_id) {
            user.account.primary_role_id = primary;
            user.account.role_label = label;
        }
    }

    fn prune_synced(&mut self, user_id: UserId) -> u64 {
        let reachable = self.reachable(user_id);
        let before = self.user_permissions.len();
        self.user_permissions.retain(|(user, permission), (_, source)| {
            *user != user_id || *source != GrantSource::Synced || reachable.contains(permission)
        });
        (before - self.user_permissions.len()) as u64
    }

    fn sync(&mut self, user_id: UserId) -> u64 {
        let mut inserted = 0;
        for permission in self.reachable(user_id) {
            let key = (user_id, permission);
            if !self.user_permissions.contains_key(&key) {
                self.user_permissions
                    .insert(key, (true, GrantSource::Synced));
                inserted += 1;
            }
        }
        inserted
    }

    fn role_state(&self, user_id: UserId) -> Option<UserRoleState> {
        let account = &self.users.get(&user_id)?.account;
        Some(UserRoleState {
            user_id,
            role_label: account.role_label.clone(),
            primary_role: account
                .primary_role_id
                .and_then(|role_id| self.role_summary(role_id).ok()),
            assigned_roles: self
                .roles_of(user_id)
                .into_iter()
                .filter_map(|role_id| self.role_summary(role_id).ok())
                .collect(),
        })
    }

    fn primary_of(&self, user_id: UserId) -> Option<RoleSummary> {
        self.users
            .get(&user_id)
            .and_then(|user| user.account.primary_role_id)
            .and_then(|role_id| self.role_summary(role_id).ok())
    }
}

/// Shared fake backing every port, mirroring the transactional repositories.
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub(crate) async fn with_catalog(names: &[&str]) -> Arc<Self> {
        let store = Arc::new(Self::default());
        for value in names {
            store.add_permission(value).await;
        }
        store
    }

    pub(crate) async fn add_permission(&self, value: &str) {
        let permission = name(value);
        self.state.lock().await.permissions.insert(
            permission.clone(),
            PermissionDefinition {
                permission_id: PermissionId::new(),
                module: permission.module().to_owned(),
                display_name: format!("Display {value}"),
                name: permission,
            },
        );
    }

    pub(crate) async fn add_role(&self, role_name: &str, is_system: bool, grants: &[&str]) -> RoleId {
        let role_id = RoleId::new();
        self.state.lock().await.roles.insert(
            role_id,
            FakeRole {
                name: role_name.to_owned(),
                display_name: role_name.to_owned(),
                description: String::new(),
                is_system,
                permissions: grants.iter().map(|value| name(value)).collect(),
            },
        );
        role_id
    }

    pub(crate) async fn add_user(&self, email: &str) -> UserId {
        let user_id = UserId::new();
        self.state.lock().await.users.insert(
            user_id,
            FakeUser {
                account: UserAccount {
                    user_id,
                    email: email.to_owned(),
                    display_name: email.split('@').next().unwrap_or_default().to_owned(),
                    role_label: None,
                    primary_role_id: None,
                },
                password_hash: None,
            },
        );
        user_id
    }

    pub(crate) async fn set_password_hash(&self, user_id: UserId, hash: &str) {
        if let Some(user) = self.state.lock().await.users.get_mut(&user_id) {
            user.password_hash = Some(hash.to_owned());
        }
    }

    /// Links a role without touching the label, as legacy scripts did.
    pub(crate) async fn link_role(&self, user_id: UserId, role_id: RoleId) {
        self.state.lock().await.user_roles.push((user_id, role_id));
    }

    /// Writes raw label columns without any derivation.
    pub(crate) async fn set_raw_labels(
        &self,
        user_id: UserId,
        role_label: Option<&str>,
        primary_role_id: Option<RoleId>,
    ) {
        if let Some(user) = self.state.lock().await.users.get_mut(&user_id) {
            user.account.role_label = role_label.map(ToOwned::to_owned);
            user.account.primary_role_id = primary_role_id;
        }
    }

    pub(crate) async fn insert_grant(
        &self,
        user_id: UserId,
        permission: &str,
        granted: bool,
        source: GrantSource,
    ) {
        self.state
            .lock()
            .await
            .user_permissions
            .insert((user_id, name(permission)), (granted, source));
    }

    pub(crate) async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    pub(crate) async fn rows_for(&self, user_id: UserId) -> Vec<(String, bool, GrantSource)> {
        self.state
            .lock()
            .await
            .user_permissions
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((_, permission), (granted, source))| {
                (permission.to_string(), *granted, *source)
            })
            .collect()
    }

    pub(crate) async fn account(&self, user_id: UserId) -> Option<UserAccount> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .map(|user| user.account.clone())
    }

    pub(crate) async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.audit_events.clone()
    }

    pub(crate) fn authorization_service(self: &Arc<Self>) -> AuthorizationService {
        AuthorizationService::new(self.clone(), AuthorizationPolicy::default())
    }
}

#[async_trait]
impl AuthorizationRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.users.get(&user_id).map(|user| user.account.clone()))
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleSummary>> {
        let state = self.state.lock().await;
        state.check_available()?;
        state
            .roles_of(user_id)
            .into_iter()
            .map(|role_id| state.role_summary(role_id))
            .collect()
    }

    async fn list_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<PermissionName>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let permissions: BTreeSet<PermissionName> = role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .flat_map(|role| role.permissions.iter().cloned())
            .collect();
        Ok(permissions.into_iter().collect())
    }

    async fn list_direct_grants(&self, user_id: UserId) -> AppResult<Vec<DirectGrant>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .user_permissions
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((user, permission), (granted, source))| DirectGrant {
                user_id: *user,
                permission: permission.clone(),
                granted: *granted,
                source: *source,
            })
            .collect())
    }

    async fn find_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<Option<DirectGrant>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .user_permissions
            .get(&(user_id, permission.clone()))
            .map(|(granted, source)| DirectGrant {
                user_id,
                permission: permission.clone(),
                granted: *granted,
                source: *source,
            }))
    }

    async fn roles_grant_permission(
        &self,
        role_ids: &[RoleId],
        permission: &PermissionName,
    ) -> AppResult<bool> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .any(|role| role.permissions.contains(permission)))
    }

    async fn list_permission_catalog(&self) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.permissions.values().cloned().collect())
    }

    async fn permission_exists(&self, permission: &PermissionName) -> AppResult<bool> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state.permissions.contains_key(permission))
    }
}

#[async_trait]
impl SecurityAdminRepository for FakeStore {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.lock().await;
        let mut roles = state
            .roles
            .keys()
            .map(|role_id| state.role_definition(*role_id))
            .collect::<AppResult<Vec<_>>>()?;
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        let role_name = input.name.trim().to_owned();
        if role_name.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }
        if state.roles.values().any(|role| role.name == role_name) {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' already exists"
            )));
        }
        for permission in &input.permissions {
            state.require_permission(permission)?;
        }

        let role_id = RoleId::new();
        state.roles.insert(
            role_id,
            FakeRole {
                name: role_name,
                display_name: input.display_name,
                description: input.description,
                is_system: false,
                permissions: input.permissions.into_iter().collect(),
            },
        );
        state.role_definition(role_id)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<RoleSummary> {
        let mut state = self.state.lock().await;
        let summary = state.role_summary(role_id)?;
        let holders: Vec<UserId> = state
            .user_roles
            .iter()
            .filter(|(_, role)| *role == role_id)
            .map(|(user, _)| *user)
            .collect();

        if state.roles.get(&role_id).is_some_and(|role| role.is_system) && !holders.is_empty() {
            return Err(AppError::Conflict(format!(
                "system role '{}' is still assigned to {} users",
                summary.name,
                holders.len()
            )));
        }

        state.user_roles.retain(|(_, role)| *role != role_id);
        state.roles.remove(&role_id);

        for user_id in holders {
            let still_primary = state
                .users
                .get(&user_id)
                .is_some_and(|user| user.account.primary_role_id == Some(role_id));
            if still_primary {
                let next = state.roles_of(user_id).first().copied();
                state.write_primary(user_id, next);
            }
            state.prune_synced(user_id);
        }

        Ok(summary)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permissions: Vec<PermissionName>,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        state.role_summary(role_id)?;
        for permission in &permissions {
            state.require_permission(permission)?;
        }
        if let Some(role) = state.roles.get_mut(&role_id) {
            role.permissions = permissions.into_iter().collect();
        }

        let holders: Vec<UserId> = state
            .user_roles
            .iter()
            .filter(|(_, role)| *role == role_id)
            .map(|(user, _)| *user)
            .collect();
        for user_id in holders {
            state.prune_synced(user_id);
            state.sync(user_id);
        }

        state.role_definition(role_id)
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.lock().await;
        let mut permissions: Vec<PermissionDefinition> =
            state.permissions.values().cloned().collect();
        permissions.sort_by(|left, right| {
            left.module
                .cmp(&right.module)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(permissions)
    }

    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.lock().await;
        if state.permissions.contains_key(&input.name) {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.name
            )));
        }
        let definition = PermissionDefinition {
            permission_id: PermissionId::new(),
            module: input.name.module().to_owned(),
            display_name: input.display_name,
            name: input.name,
        };
        state
            .permissions
            .insert(definition.name.clone(), definition.clone());
        Ok(definition)
    }

    async fn retire_permission(&self, permission: &PermissionName) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_permission(permission)?;
        state.permissions.remove(permission);
        for role in state.roles.values_mut() {
            role.permissions.remove(permission);
        }
        state
            .user_permissions
            .retain(|(_, stored), _| stored != permission);
        Ok(())
    }

    async fn replace_permission(
        &self,
        permission: &PermissionName,
        replacement: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.lock().await;
        state.require_permission(permission)?;
        if state.permissions.contains_key(&replacement.name) {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                replacement.name
            )));
        }

        let definition = PermissionDefinition {
            permission_id: PermissionId::new(),
            module: replacement.name.module().to_owned(),
            display_name: replacement.display_name,
            name: replacement.name,
        };
        state
            .permissions
            .insert(definition.name.clone(), definition.clone());

        for role in state.roles.values_mut() {
            if role.permissions.remove(permission) {
                role.permissions.insert(definition.name.clone());
            }
        }

        let moved: Vec<(UserId, (bool, GrantSource))> = state
            .user_permissions
            .iter()
            .filter(|((_, stored), _)| stored == permission)
            .map(|((user, _), value)| (*user, *value))
            .collect();
        state
            .user_permissions
            .retain(|(_, stored), _| stored != permission);
        for (user_id, value) in moved {
            state
                .user_permissions
                .insert((user_id, definition.name.clone()), value);
        }

        state.permissions.remove(permission);
        Ok(definition)
    }

    async fn list_role_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let state = self.state.lock().await;
        let primary = state
            .users
            .get(&user_id)
            .and_then(|user| user.account.primary_role_id);
        state
            .roles_of(user_id)
            .into_iter()
            .map(|role_id| {
                state.role_summary(role_id).map(|role| RoleAssignment {
                    user_id,
                    role_id,
                    role_name: role.name,
                    is_primary: primary == Some(role_id),
                    assigned_at: "2026-01-01T00:00:00Z".to_owned(),
                })
            })
            .collect()
    }

    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<RoleChangeOutcome> {
        let mut state = self.state.lock().await;
        state.require_user(input.user_id)?;
        let role = state.role_summary(input.role_id)?;

        let before = state.roles_of(input.user_id);
        if input.mode == AssignmentMode::Replace {
            state
                .user_roles
                .retain(|(user, role_id)| *user != input.user_id || *role_id == input.role_id);
        }
        if !state.roles_of(input.user_id).contains(&input.role_id) {
            state.user_roles.push((input.user_id, input.role_id));
        }
        let changed = state.roles_of(input.user_id) != before;

        let current_primary = state
            .users
            .get(&input.user_id)
            .and_then(|user| user.account.primary_role_id);
        let primary = match input.mode {
            AssignmentMode::Replace => Some(input.role_id),
            AssignmentMode::Add => current_primary.or(Some(input.role_id)),
        };
        state.write_primary(input.user_id, primary);

        let stale_grants_removed = state.prune_synced(input.user_id);
        let synced_grants_inserted = state.sync(input.user_id);

        Ok(RoleChangeOutcome {
            primary_role: state.primary_of(input.user_id),
            role,
            changed,
            synced_grants_inserted,
            stale_grants_removed,
        })
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<RoleChangeOutcome> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        let role = state.role_summary(role_id)?;

        let held = state.roles_of(user_id).contains(&role_id);
        if !held {
            return Ok(RoleChangeOutcome {
                primary_role: state.primary_of(user_id),
                role,
                changed: false,
                synced_grants_inserted: 0,
                stale_grants_removed: 0,
            });
        }

        state
            .user_roles
            .retain(|(user, stored)| *user != user_id || *stored != role_id);

        let was_primary = state
            .users
            .get(&user_id)
            .is_some_and(|user| user.account.primary_role_id == Some(role_id));
        if was_primary {
            let next = state.roles_of(user_id).first().copied();
            state.write_primary(user_id, next);
        }

        let stale_grants_removed = state.prune_synced(user_id);
        Ok(RoleChangeOutcome {
            primary_role: state.primary_of(user_id),
            role,
            changed: true,
            synced_grants_inserted: 0,
            stale_grants_removed,
        })
    }

    async fn sync_user_permissions(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        Ok(state.sync(user_id))
    }

    async fn upsert_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
        granted: bool,
    ) -> AppResult<DirectGrant> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        state.require_permission(permission)?;
        state.user_permissions.insert(
            (user_id, permission.clone()),
            (granted, GrantSource::Explicit),
        );
        Ok(DirectGrant {
            user_id,
            permission: permission.clone(),
            granted,
            source: GrantSource::Explicit,
        })
    }

    async fn delete_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .user_permissions
            .remove(&(user_id, permission.clone()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' has no override for '{permission}'"
                ))
            })
    }
}

#[async_trait]
impl ConsistencyRepository for FakeStore {
    async fn list_user_role_states(&self) -> AppResult<Vec<UserRoleState>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .keys()
            .filter_map(|user_id| state.role_state(*user_id))
            .collect())
    }

    async fn list_synced_grants(&self) -> AppResult<Vec<DirectGrant>> {
        let state = self.state.lock().await;
        Ok(state
            .user_permissions
            .iter()
            .filter(|(_, (_, source))| *source == GrantSource::Synced)
            .map(|((user_id, permission), (granted, source))| DirectGrant {
                user_id: *user_id,
                permission: permission.clone(),
                granted: *granted,
                source: *source,
            })
            .collect())
    }

    async fn repair_user(&self, user_id: UserId) -> AppResult<UserRepair> {
        let mut state = self.state.lock().await;
        state.check_available()?;
        let role_state = state
            .role_state(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        let plan = role_state.repair_plan();
        if let Some(primary) = plan.primary_role.as_ref().filter(|_| plan.insert_edge) {
            state.user_roles.push((user_id, primary.role_id));
        }
        if plan.rewrite_primary_role {
            state.write_primary(user_id, plan.primary_role.as_ref().map(|role| role.role_id));
        }
        let stale_grants_removed = state.prune_synced(user_id);
        let grants_synced = state.sync(user_id);

        Ok(UserRepair {
            primary_role: plan.primary_role,
            primary_role_rewritten: plan.rewrite_primary_role,
            edge_inserted: plan.insert_edge,
            stale_grants_removed,
            grants_synced,
        })
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit_events.push(event);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .users
            .values()
            .find(|user| user.account.email == email.as_str())
            .map(|user| UserCredentials {
                user_id: user.account.user_id,
                password_hash: user.password_hash.clone(),
            }))
    }
}

/// Deterministic hasher: `hashed:<password>`.
pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}
