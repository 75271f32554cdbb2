use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use portico_application::AuthorizationRepository;
use portico_core::AppResult;
use portico_domain::{
    DirectGrant, GrantSource, PermissionDefinition, PermissionId, PermissionName, RoleId,
    RoleSummary, UserAccount, UserId,
};

use crate::postgres_support::{database_error, decode_permission_name};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for permission resolution reads.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserAccountRow {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) display_name: String,
    pub(crate) role_label: Option<String>,
    pub(crate) primary_role_id: Option<Uuid>,
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            role_label: row.role_label,
            primary_role_id: row.primary_role_id.map(RoleId::from_uuid),
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleSummaryRow {
    role_id: Uuid,
    role_name: String,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission: String,
}

#[derive(Debug, FromRow)]
struct DirectGrantRow {
    permission: String,
    granted: bool,
    source: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionDefinitionRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) module: String,
}

impl PermissionDefinitionRow {
    pub(crate) fn decode(self) -> Option<PermissionDefinition> {
        let name = decode_permission_name(self.name.as_str())?;
        Some(PermissionDefinition {
            permission_id: PermissionId::from_uuid(self.id),
            name,
            display_name: self.display_name,
            module: self.module,
        })
    }
}

fn role_uuids(role_ids: &[RoleId]) -> Vec<Uuid> {
    role_ids.iter().map(RoleId::as_uuid).collect()
}

fn decode_grant(user_id: UserId, row: DirectGrantRow) -> Option<DirectGrant> {
    let permission = decode_permission_name(row.permission.as_str())?;
    let source = match row.source.parse::<GrantSource>() {
        Ok(source) => source,
        Err(error) => {
            warn!(
                %user_id,
                source = %row.source,
                %error,
                "skipping overlay row with unknown source"
            );
            return None;
        }
    };

    Some(DirectGrant {
        user_id,
        permission,
        granted: row.granted,
        source,
    })
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT id, email, display_name, role_label, primary_role_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load user", error))?;

        Ok(row.map(UserAccount::from))
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleSummary>> {
        let rows = sqlx::query_as::<_, RoleSummaryRow>(
            r#"
            SELECT roles.id AS role_id, roles.name AS role_name
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY user_roles.created_at, roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to load user roles", error))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleSummary {
                role_id: RoleId::from_uuid(row.role_id),
                name: row.role_name,
            })
            .collect())
    }

    async fn list_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<PermissionName>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT DISTINCT permissions.name AS permission
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = ANY($1)
            ORDER BY permissions.name
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to load role permissions", error))?;

        Ok(rows
            .iter()
            .filter_map(|row| decode_permission_name(row.permission.as_str()))
            .collect())
    }

    async fn list_direct_grants(&self, user_id: UserId) -> AppResult<Vec<DirectGrant>> {
        let rows = sqlx::query_as::<_, DirectGrantRow>(
            r#"
            SELECT permissions.name AS permission, user_permissions.granted, user_permissions.source
            FROM user_permissions
            INNER JOIN permissions
                ON permissions.id = user_permissions.permission_id
            WHERE user_permissions.user_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to load direct grants", error))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| decode_grant(user_id, row))
            .collect())
    }

    async fn find_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<Option<DirectGrant>> {
        let row = sqlx::query_as::<_, DirectGrantRow>(
            r#"
            SELECT permissions.name AS permission, user_permissions.granted, user_permissions.source
            FROM user_permissions
            INNER JOIN permissions
                ON permissions.id = user_permissions.permission_id
            WHERE user_permissions.user_id = $1
                AND permissions.name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load direct grant", error))?;

        Ok(row.and_then(|row| decode_grant(user_id, row)))
    }

    async fn roles_grant_permission(
        &self,
        role_ids: &[RoleId],
        permission: &PermissionName,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_permissions
                INNER JOIN permissions
                    ON permissions.id = role_permissions.permission_id
                WHERE role_permissions.role_id = ANY($1)
                    AND permissions.name = $2
            )
            "#,
        )
        .bind(role_uuids(role_ids))
        .bind(permission.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| database_error("failed to check role grant", error))
    }

    async fn list_permission_catalog(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionDefinitionRow>(
            r#"
            SELECT id, name, display_name, module
            FROM permissions
            ORDER BY module, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to load permission catalog", error))?;

        Ok(rows
            .into_iter()
            .filter_map(PermissionDefinitionRow::decode)
            .collect())
    }

    async fn permission_exists(&self, permission: &PermissionName) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM permissions WHERE name = $1)
            "#,
        )
        .bind(permission.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| database_error("failed to check permission", error))
    }
}
