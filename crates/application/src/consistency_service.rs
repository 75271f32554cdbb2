//! Detection and repair of drift between normalized role tables and the
//! data derived from them (legacy labels, materialized grants).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use portico_core::{AppError, AppResult, UserIdentity};
use portico_domain::{
    AuditAction, ConsistencyIssue, DirectGrant, PermissionName, RoleSummary, UserRoleState,
    UserId, well_known,
};
use tracing::{info, warn};

use crate::{AuditEvent, AuditRepository, AuthorizationService};


/// Repository port for consistency audits and repairs.
#[async_trait]
pub trait ConsistencyRepository: Send + Sync {
    /// Lists the stored role linkage of every user.
    async fn list_user_role_states(&self) -> AppResult<Vec<UserRoleState>>;

    /// Lists every synced overlay row.
    async fn list_synced_grants(&self) -> AppResult<Vec<DirectGrant>>;

    /// Repairs one user atomically.
    ///
    /// Locks the user, re-reads its role linkage, applies
    /// [`UserRoleState::repair_plan`], then prunes and re-syncs its synced
    /// rows against the repaired roles. Explicit rows are never touched.
    async fn repair_user(&self, user_id: UserId) -> AppResult<UserRepair>;
}

/// Writes applied to one user by [`ConsistencyRepository::repair_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRepair {
    /// Primary role after repair.
    pub primary_role: Option<RoleSummary>,
    /// Whether the primary role and label were rewritten.
    pub primary_role_rewritten: bool,
    /// Whether a missing primary-role edge was inserted.
    pub edge_inserted: bool,
    /// Synced rows removed because no role grants them anymore.
    pub stale_grants_removed: u64,
    /// Synced rows inserted for role-reachable permissions.
    pub grants_synced: u64,
}

/// Issues found by one audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Number of users inspected.
    pub users_checked: usize,
    /// Issues found, grouped by user in inspection order.
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    /// Returns whether nothing needs repair.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }

    /// Counts issues per kind.
    #[must_use]
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// Application service auditing and repairing derived role data.
#[derive(Clone)]
pub struct ConsistencyService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ConsistencyRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ConsistencyService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ConsistencyRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Audits on behalf of an administrator.
    pub async fn audit_as(&self, actor: &UserIdentity) -> AppResult<ConsistencyReport> {
        self.authorization_service
            .require_permission(UserId::from_uuid(actor.user_id()), well_known::SETTINGS_EDIT)
            .await?;
        self.audit().await
    }

    /// Repairs on behalf of an administrator.
    pub async fn repair_as(&self, actor: &UserIdentity) -> AppResult<ConsistencyReport> {
        let actor_id = UserId::from_uuid(actor.user_id());
        self.authorization_service
            .require_permission(actor_id, well_known::SETTINGS_EDIT)
            .await?;
        self.repair(Some(actor_id)).await
    }

    /// Lists every divergence without changing anything.
    ///
    /// Each issue is logged; none of them is ever used for authorization.
    pub async fn audit(&self) -> AppResult<ConsistencyReport> {
        let states = self.repository.list_user_role_states().await?;
        let mut issues: Vec<ConsistencyIssue> =
            states.iter().flat_map(UserRoleState::role_issues).collect();

        let mut synced_by_user: BTreeMap<UserId, Vec<PermissionName>> = BTreeMap::new();
        for grant in self.repository.list_synced_grants().await? {
            synced_by_user
                .entry(grant.user_id)
                .or_default()
                .push(grant.permission);
        }

        for (user_id, permissions) in synced_by_user {
            let reachable = self
                .authorization_service
                .role_reachable_permissions(user_id)
                .await?;
            issues.extend(
                permissions
                    .into_iter()
                    .filter(|permission| !reachable.contains(permission))
                    .map(|permission| ConsistencyIssue::StaleSyncedGrant {
                        user_id,
                        permission,
                    }),
            );
        }

        for issue in &issues {
            warn!(user_id = %issue.user_id(), kind = issue.kind(), ?issue, "role data inconsistency");
        }

        Ok(ConsistencyReport {
            users_checked: states.len(),
            issues,
        })
    }

    /// Fixes every divergence found by [`Self::audit`] and returns what was fixed.
    ///
    /// The report only selects which users to repair; each user is repaired
    /// from its current state, read under a row lock. Labels are regenerated
    /// from the primary role, never the other way round.
    pub async fn repair(&self, actor: Option<UserId>) -> AppResult<ConsistencyReport> {
        let report = self.audit().await?;
        if report.is_consistent() {
            return Ok(report);
        }

        let user_ids: BTreeSet<UserId> =
            report.issues.iter().map(ConsistencyIssue::user_id).collect();
        for user_id in user_ids {
            let repair = match self.repository.repair_user(user_id).await {
                Ok(repair) => repair,
                Err(AppError::NotFound(_)) => {
                    warn!(user_id = %user_id, "user vanished before repair; skipping");
                    continue;
                }
                Err(error) => return Err(error),
            };
            info!(
                user_id = %user_id,
                primary_role = ?repair.primary_role.as_ref().map(|role| role.name.as_str()),
                primary_role_rewritten = repair.primary_role_rewritten,
                edge_inserted = repair.edge_inserted,
                stale_grants_removed = repair.stale_grants_removed,
                grants_synced = repair.grants_synced,
                "user role data repaired"
            );
        }

        let counts = report.counts_by_kind();
        info!(repaired = report.issues.len(), ?counts, "role data repaired");

        if let Some(actor) = actor {
            self.audit_repository
                .append_event(AuditEvent {
                    actor,
                    action: AuditAction::ConsistencyRepaired,
                    resource_type: "rbac_consistency".to_owned(),
                    resource_id: "all_users".to_owned(),
                    detail: Some(format!(
                        "repaired {} issues across {} users: {counts:?}",
                        report.issues.len(),
                        report.users_checked
                    )),
                })
                .await?;
        }

        Ok(report)
    }
}
