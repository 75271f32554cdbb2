use tracing::info;

use crate::postgres_support::unique_violation;

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.display_name,
                roles.description,
                roles.is_system,
                permissions.name AS permission
            FROM roles
            LEFT JOIN role_permissions
                ON role_permissions.role_id = roles.id
            LEFT JOIN permissions
                ON permissions.id = role_permissions.permission_id
            ORDER BY roles.name, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list roles", error))?;

        Ok(aggregate_roles(rows))
    }

    pub(super) async fn create_role_impl(
        &self,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let role_name = input.name.trim().to_owned();
        if role_name.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        let mut transaction = self.begin().await?;

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (name, display_name, description, is_system)
            VALUES ($1, $2, $3, false)
            RETURNING id
            "#,
        )
        .bind(role_name.as_str())
        .bind(input.display_name.as_str())
        .bind(input.description.as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            unique_violation(
                "failed to create role",
                format!("role '{role_name}' already exists"),
                error,
            )
        })?;

        let permission_ids = resolve_permission_ids(&mut transaction, &input.permissions).await?;
        insert_role_grants(&mut transaction, role_id, &permission_ids).await?;

        commit(transaction).await?;
        info!(role = %role_name, grants = permission_ids.len(), "role created");

        let mut permissions = input.permissions;
        permissions.sort();
        permissions.dedup();

        Ok(RoleDefinition {
            role_id: RoleId::from_uuid(role_id),
            name: role_name,
            display_name: input.display_name,
            description: input.description,
            is_system: false,
            permissions,
        })
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<RoleSummary> {
        let mut transaction = self.begin().await?;

        let (role_name, is_system) = sqlx::query_as::<_, (String, bool)>(
            r#"
            SELECT name, is_system
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to resolve role", error))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let affected_users = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM users
            WHERE id IN (SELECT user_id FROM user_roles WHERE role_id = $1)
                OR primary_role_id = $1
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to lock role holders", error))?;

        let holders = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to count role holders", error))?;

        if is_system && holders > 0 {
            return Err(AppError::Conflict(format!(
                "system role '{role_name}' is still assigned to {holders} users"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to delete role assignments", error))?;

        for user_uuid in affected_users {
            let user_id = UserId::from_uuid(user_uuid);
            let primary = lock_user(&mut transaction, user_id).await?;
            if primary == Some(role_id.as_uuid()) {
                let next = oldest_remaining_role(&mut transaction, user_id).await?;
                write_primary_role(&mut transaction, user_id, next).await?;
            }
            prune_stale_synced_grants(&mut transaction, user_id).await?;
        }

        sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to delete role", error))?;

        commit(transaction).await?;
        info!(role = %role_name, "role deleted");

        Ok(RoleSummary {
            role_id,
            name: role_name,
        })
    }

    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_id: RoleId,
        permissions: Vec<PermissionName>,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;

        let role = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                id AS role_id,
                name AS role_name,
                display_name,
                description,
                is_system,
                NULL::TEXT AS permission
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to resolve role", error))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let permission_ids = resolve_permission_ids(&mut transaction, &permissions).await?;

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to clear role grants", error))?;

        insert_role_grants(&mut transaction, role_id.as_uuid(), &permission_ids).await?;

        let holders = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM user_roles
            WHERE role_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to list role holders", error))?;

        for user_uuid in holders {
            let user_id = UserId::from_uuid(user_uuid);
            lock_user(&mut transaction, user_id).await?;
            prune_stale_synced_grants(&mut transaction, user_id).await?;
            sync_role_grants(&mut transaction, user_id).await?;
        }

        commit(transaction).await?;
        info!(role = %role.role_name, grants = permission_ids.len(), "role grants replaced");

        let mut permissions = permissions;
        permissions.sort();
        permissions.dedup();

        Ok(RoleDefinition {
            role_id,
            name: role.role_name,
            display_name: role.display_name,
            description: role.description,
            is_system: role.is_system,
            permissions,
        })
    }
}

async fn insert_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: Uuid,
    permission_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, permission_id
        FROM UNNEST($2::UUID[]) AS grants (permission_id)
        ON CONFLICT (role_id, permission_id) DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to persist role grants", error))?;

    Ok(())
}
