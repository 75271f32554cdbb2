use portico_domain::AssignmentMode;
use tracing::debug;

use super::*;

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    role_id: Uuid,
    role_name: String,
    is_primary: bool,
    assigned_at: String,
}

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_role_assignments_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                user_roles.role_id,
                roles.name AS role_name,
                COALESCE(users.primary_role_id = roles.id, false) AS is_primary,
                to_char(user_roles.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS assigned_at
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            INNER JOIN users
                ON users.id = user_roles.user_id
            WHERE user_roles.user_id = $1
            ORDER BY user_roles.created_at, roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list role assignments", error))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleAssignment {
                user_id,
                role_id: RoleId::from_uuid(row.role_id),
                role_name: row.role_name,
                is_primary: row.is_primary,
                assigned_at: row.assigned_at,
            })
            .collect())
    }

    pub(super) async fn assign_role_impl(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<RoleChangeOutcome> {
        let mut transaction = self.begin().await?;

        let current_primary = lock_user(&mut transaction, input.user_id).await?;
        let role = require_role(&mut transaction, input.role_id).await?;

        let removed = if input.mode == AssignmentMode::Replace {
            sqlx::query(
                r#"
                DELETE FROM user_roles
                WHERE user_id = $1
                    AND role_id <> $2
                "#,
            )
            .bind(input.user_id.as_uuid())
            .bind(input.role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| database_error("failed to replace role assignments", error))?
            .rows_affected()
        } else {
            0
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(input.role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to assign role", error))?
        .rows_affected();

        let primary = match input.mode {
            AssignmentMode::Replace => input.role_id.as_uuid(),
            AssignmentMode::Add => current_primary.unwrap_or(input.role_id.as_uuid()),
        };
        write_primary_role(&mut transaction, input.user_id, Some(primary)).await?;

        let stale_grants_removed = prune_stale_synced_grants(&mut transaction, input.user_id).await?;
        let synced_grants_inserted = sync_role_grants(&mut transaction, input.user_id).await?;
        let primary_role = find_role(&mut transaction, primary).await?;

        commit(transaction).await?;
        debug!(
            user_id = %input.user_id,
            removed,
            inserted,
            "role assignment edges written"
        );

        Ok(RoleChangeOutcome {
            role,
            changed: removed + inserted > 0,
            primary_role,
            synced_grants_inserted,
            stale_grants_removed,
        })
    }

    pub(super) async fn revoke_role_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<RoleChangeOutcome> {
        let mut transaction = self.begin().await?;

        let current_primary = lock_user(&mut transaction, user_id).await?;
        let role = require_role(&mut transaction, role_id).await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
                AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to revoke role", error))?
        .rows_affected();

        if removed == 0 {
            let primary_role = match current_primary {
                Some(primary) => find_role(&mut transaction, primary).await?,
                None => None,
            };
            return Ok(RoleChangeOutcome {
                role,
                changed: false,
                primary_role,
                synced_grants_inserted: 0,
                stale_grants_removed: 0,
            });
        }

        let primary = if current_primary == Some(role_id.as_uuid()) {
            let next = oldest_remaining_role(&mut transaction, user_id).await?;
            write_primary_role(&mut transaction, user_id, next).await?;
            next
        } else {
            current_primary
        };

        let stale_grants_removed = prune_stale_synced_grants(&mut transaction, user_id).await?;
        let primary_role = match primary {
            Some(primary) => find_role(&mut transaction, primary).await?,
            None => None,
        };

        commit(transaction).await?;

        Ok(RoleChangeOutcome {
            role,
            changed: true,
            primary_role,
            synced_grants_inserted: 0,
            stale_grants_removed,
        })
    }

    pub(super) async fn sync_user_permissions_impl(&self, user_id: UserId) -> AppResult<u64> {
        let mut transaction = self.begin().await?;
        lock_user(&mut transaction, user_id).await?;
        let inserted = sync_role_grants(&mut transaction, user_id).await?;
        commit(transaction).await?;

        Ok(inserted)
    }
}
