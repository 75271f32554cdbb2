use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use portico_application::{
    AssignRoleInput, CreatePermissionInput, CreateRoleInput, RoleAssignment, RoleChangeOutcome,
    SecurityAdminRepository,
};
use portico_core::{AppError, AppResult};
use portico_domain::{
    DirectGrant, PermissionDefinition, PermissionName, RoleDefinition, RoleId, RoleSummary, UserId,
};

use crate::postgres_support::{database_error, decode_permission_name};

mod assignments;
mod overlay;
mod permissions;
mod roles;


/// PostgreSQL-backed repository for role, catalog and overlay administration.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| database_error("failed to begin transaction", error))
    }
}

pub(crate) async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| database_error("failed to commit transaction", error))
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: Uuid,
    role_name: String,
    display_name: String,
    description: String,
    is_system: bool,
    permission: Option<String>,
}

#[derive(Debug, FromRow)]
struct RoleSummaryRow {
    role_id: Uuid,
    role_name: String,
}

impl From<RoleSummaryRow> for RoleSummary {
    fn from(row: RoleSummaryRow) -> Self {
        Self {
            role_id: RoleId::from_uuid(row.role_id),
            name: row.role_name,
        }
    }
}

fn aggregate_roles(rows: Vec<RoleRow>) -> Vec<RoleDefinition> {
    let mut grouped: BTreeMap<Uuid, RoleDefinition> = BTreeMap::new();

    for row in rows {
        let entry = grouped
            .entry(row.role_id)
            .or_insert_with(|| RoleDefinition {
                role_id: RoleId::from_uuid(row.role_id),
                name: row.role_name.clone(),
                display_name: row.display_name.clone(),
                description: row.description.clone(),
                is_system: row.is_system,
                permissions: Vec::new(),
            });

        if let Some(permission) = row
            .permission
            .as_deref()
            .and_then(decode_permission_name)
        {
            entry.permissions.push(permission);
        }
    }

    let mut roles: Vec<RoleDefinition> = grouped.into_values().collect();
    roles.sort_by(|left, right| left.name.cmp(&right.name));
    roles
}

/// Locks the user row and returns its current primary role.
pub(crate) async fn lock_user(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<Option<Uuid>> {
    sqlx::query_scalar::<_, Option<Uuid>>(
        r#"
        SELECT primary_role_id
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to lock user", error))?
    .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
}

async fn find_role(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: Uuid,
) -> AppResult<Option<RoleSummary>> {
    let row = sqlx::query_as::<_, RoleSummaryRow>(
        r#"
        SELECT id AS role_id, name AS role_name
        FROM roles
        WHERE id = $1
        "#,
    )
    .bind(role_id)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to resolve role", error))?;

    Ok(row.map(RoleSummary::from))
}

async fn require_role(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
) -> AppResult<RoleSummary> {
    find_role(transaction, role_id.as_uuid())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
}

/// Resolves catalog ids for the names; any unknown name is a not-found error.
async fn resolve_permission_ids(
    transaction: &mut Transaction<'_, Postgres>,
    permissions: &[PermissionName],
) -> AppResult<Vec<Uuid>> {
    let names: Vec<String> = permissions.iter().map(ToString::to_string).collect();
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT id, name
        FROM permissions
        WHERE name = ANY($1)
        "#,
    )
    .bind(names.as_slice())
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to resolve permissions", error))?;

    if let Some(missing) = names
        .iter()
        .find(|name| !rows.iter().any(|(_, stored)| stored == *name))
    {
        return Err(AppError::NotFound(format!(
            "permission '{missing}' was not found"
        )));
    }

    Ok(rows.into_iter().map(|(id, _)| id).collect())
}

/// Points the primary role at `role_id` and derives the legacy label from it.
pub(crate) async fn write_primary_role(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    role_id: Option<Uuid>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET primary_role_id = $2,
            role_label = (SELECT name FROM roles WHERE id = $2),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(role_id)
    .execute(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to write primary role", error))?;

    Ok(())
}

async fn oldest_remaining_role(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT role_id
        FROM user_roles
        WHERE user_id = $1
        ORDER BY created_at, role_id
        LIMIT 1
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to resolve remaining roles", error))
}

/// Deletes synced rows no remaining role of the user grants.
pub(crate) async fn prune_stale_synced_grants(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_permissions AS overlay
        WHERE overlay.user_id = $1
            AND overlay.source = 'synced'
            AND NOT EXISTS (
                SELECT 1
                FROM user_roles
                INNER JOIN role_permissions
                    ON role_permissions.role_id = user_roles.role_id
                WHERE user_roles.user_id = overlay.user_id
                    AND role_permissions.permission_id = overlay.permission_id
            )
        "#,
    )
    .bind(user_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to prune synced grants", error))?;

    Ok(result.rows_affected())
}

/// Inserts synced rows for role-reachable permissions, leaving existing rows untouched.
pub(crate) async fn sync_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_permissions (user_id, permission_id, granted, source)
        SELECT DISTINCT user_roles.user_id, role_permissions.permission_id, true, 'synced'
        FROM user_roles
        INNER JOIN role_permissions
            ON role_permissions.role_id = user_roles.role_id
        WHERE user_roles.user_id = $1
        ON CONFLICT (user_id, permission_id) DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to synchronize role grants", error))?;

    Ok(result.rows_affected())
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.list_roles_impl().await
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        self.create_role_impl(input).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<RoleSummary> {
        self.delete_role_impl(role_id).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permissions: Vec<PermissionName>,
    ) -> AppResult<RoleDefinition> {
        self.replace_role_permissions_impl(role_id, permissions)
            .await
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl().await
    }

    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.create_permission_impl(input).await
    }

    async fn retire_permission(&self, permission: &PermissionName) -> AppResult<()> {
        self.retire_permission_impl(permission).await
    }

    async fn replace_permission(
        &self,
        permission: &PermissionName,
        replacement: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.replace_permission_impl(permission, replacement).await
    }

    async fn list_role_assignments(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        self.list_role_assignments_impl(user_id).await
    }

    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<RoleChangeOutcome> {
        self.assign_role_impl(input).await
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<RoleChangeOutcome> {
        self.revoke_role_impl(user_id, role_id).await
    }

    async fn sync_user_permissions(&self, user_id: UserId) -> AppResult<u64> {
        self.sync_user_permissions_impl(user_id).await
    }

    async fn upsert_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
        granted: bool,
    ) -> AppResult<DirectGrant> {
        self.upsert_direct_grant_impl(user_id, permission, granted)
            .await
    }

    async fn delete_direct_grant(
        &self,
        user_id: UserId,
        permission: &PermissionName,
    ) -> AppResult<()> {
        self.delete_direct_grant_impl(user_id, permission).await
    }
}
