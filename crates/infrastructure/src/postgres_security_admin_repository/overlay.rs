use portico_domain::GrantSource;

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn upsert_direct_grant_impl(
        &self,
        user_id: UserId,
        permission: &PermissionName,
        granted: bool,
    ) -> AppResult<DirectGrant> {
        let mut transaction = self.begin().await?;

        lock_user(&mut transaction, user_id).await?;
        let permission_ids =
            resolve_permission_ids(&mut transaction, std::slice::from_ref(permission)).await?;

        for permission_id in permission_ids {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, permission_id, granted, source)
                VALUES ($1, $2, $3, 'explicit')
                ON CONFLICT (user_id, permission_id) DO UPDATE
                SET granted = EXCLUDED.granted,
                    source = 'explicit',
                    updated_at = now()
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(permission_id)
            .bind(granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| database_error("failed to write permission override", error))?;
        }

        commit(transaction).await?;

        Ok(DirectGrant {
            user_id,
            permission: permission.clone(),
            granted,
            source: GrantSource::Explicit,
        })
    }

    pub(super) async fn delete_direct_grant_impl(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_permissions
            USING permissions
            WHERE user_permissions.permission_id = permissions.id
                AND user_permissions.user_id = $1
                AND permissions.name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to delete permission override", error))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' has no override for '{permission}'"
            )));
        }

        Ok(())
    }
}
