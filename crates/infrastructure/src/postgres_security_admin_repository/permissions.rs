use portico_domain::PermissionId;
use tracing::info;

use crate::postgres_authorization_repository::PermissionDefinitionRow;
use crate::postgres_support::unique_violation;

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionDefinitionRow>(
            r#"
            SELECT id, name, display_name, module
            FROM permissions
            ORDER BY module, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list permissions", error))?;

        Ok(rows
            .into_iter()
            .filter_map(PermissionDefinitionRow::decode)
            .collect())
    }

    pub(super) async fn create_permission_impl(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut transaction = self.begin().await?;
        let definition = insert_permission(&mut transaction, input).await?;
        commit(transaction).await?;

        info!(permission = %definition.name, "permission created");
        Ok(definition)
    }

    pub(super) async fn retire_permission_impl(
        &self,
        permission: &PermissionName,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE name = $1
            "#,
        )
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to retire permission", error))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission}' was not found"
            )));
        }

        info!(%permission, "permission retired");
        Ok(())
    }

    pub(super) async fn replace_permission_impl(
        &self,
        permission: &PermissionName,
        replacement: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut transaction = self.begin().await?;

        let old_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM permissions
            WHERE name = $1
            FOR UPDATE
            "#,
        )
        .bind(permission.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to resolve permission", error))?
        .ok_or_else(|| AppError::NotFound(format!("permission '{permission}' was not found")))?;

        let definition = insert_permission(&mut transaction, replacement).await?;
        let new_id = definition.permission_id.as_uuid();

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT role_id, $2
            FROM role_permissions
            WHERE permission_id = $1
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(old_id)
        .bind(new_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to migrate role grants", error))?;

        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id, granted, source)
            SELECT user_id, $2, granted, source
            FROM user_permissions
            WHERE permission_id = $1
            ON CONFLICT (user_id, permission_id) DO NOTHING
            "#,
        )
        .bind(old_id)
        .bind(new_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to migrate user grants", error))?;

        sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(old_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to retire replaced permission", error))?;

        commit(transaction).await?;
        info!(from = %permission, to = %definition.name, "permission replaced");

        Ok(definition)
    }
}

async fn insert_permission(
    transaction: &mut Transaction<'_, Postgres>,
    input: CreatePermissionInput,
) -> AppResult<PermissionDefinition> {
    let module = input.name.module().to_owned();
    let permission_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO permissions (name, display_name, module)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(input.name.as_str())
    .bind(input.display_name.as_str())
    .bind(module.as_str())
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| {
        unique_violation(
            "failed to create permission",
            format!("permission '{}' already exists", input.name),
            error,
        )
    })?;

    Ok(PermissionDefinition {
        permission_id: PermissionId::from_uuid(permission_id),
        name: input.name,
        display_name: input.display_name,
        module,
    })
}
