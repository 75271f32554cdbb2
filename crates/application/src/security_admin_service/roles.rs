use portico_core::AppError;
use portico_domain::{RoleId, well_known};
use tracing::info;

use crate::{AssignRoleInput, RoleAssignment, RoleChangeOutcome};

use super::*;

impl SecurityAdminService {
    /// Assigns a role to a user and emits an audit event.
    ///
    /// The legacy label is rewritten and role grants are synchronized in the
    /// same transaction as the edge change. Re-assigning a held role is a no-op.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        input: AssignRoleInput,
    ) -> AppResult<RoleChangeOutcome> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let outcome = self.repository.assign_role(input).await?;
        info!(
            user_id = %input.user_id,
            role = %outcome.role.name,
            mode = input.mode.as_str(),
            changed = outcome.changed,
            synced = outcome.synced_grants_inserted,
            pruned = outcome.stale_grants_removed,
            "role assigned"
        );

        if outcome.changed {
            self.audit(
                actor_id,
                AuditAction::RoleAssigned,
                "rbac_user_role",
                format!("{}:{}", input.user_id, outcome.role.role_id),
                format!(
                    "assigned role '{}' to user '{}' ({})",
                    outcome.role.name,
                    input.user_id,
                    input.mode.as_str()
                ),
            )
            .await?;
        }

        Ok(outcome)
    }

    /// Removes a role from a user and emits an audit event.
    ///
    /// Materialized grants no remaining role reaches are deleted with the edge.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<RoleChangeOutcome> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let outcome = self.repository.revoke_role(user_id, role_id).await?;
        if !outcome.changed {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not hold role '{}'",
                outcome.role.name
            )));
        }

        info!(
            %user_id,
            role = %outcome.role.name,
            pruned = outcome.stale_grants_removed,
            "role revoked"
        );

        self.audit(
            actor_id,
            AuditAction::RoleRevoked,
            "rbac_user_role",
            format!("{user_id}:{role_id}"),
            format!(
                "revoked role '{}' from user '{user_id}', removed {} materialized grants",
                outcome.role.name, outcome.stale_grants_removed
            ),
        )
        .await?;

        Ok(outcome)
    }

    /// Lists role assignments of a user.
    pub async fn list_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.require(actor, well_known::USERS_VIEW).await?;
        self.repository.list_role_assignments(user_id).await
    }

    /// Materializes the user's role grants into the overlay table.
    ///
    /// Idempotent: a repeat call without role changes inserts nothing.
    pub async fn sync_user_permissions(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<u64> {
        let actor_id = self.require(actor, well_known::ROLES_MANAGE).await?;

        let inserted = self.repository.sync_user_permissions(user_id).await?;
        if inserted > 0 {
            self.audit(
                actor_id,
                AuditAction::UserPermissionsSynced,
                "rbac_user_permission",
                user_id.to_string(),
                format!("materialized {inserted} role grants for user '{user_id}'"),
            )
            .await?;
        }

        Ok(inserted)
    }
}
