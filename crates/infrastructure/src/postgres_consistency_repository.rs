//! PostgreSQL-backed reads and per-user transactional repairs for the
//! consistency audit.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use portico_application::{ConsistencyRepository, UserRepair};
use portico_core::{AppError, AppResult};
use portico_domain::{DirectGrant, GrantSource, RoleId, RoleSummary, UserId, UserRoleState};

use crate::postgres_security_admin_repository::{
    commit, lock_user, prune_stale_synced_grants, sync_role_grants, write_primary_role,
};
use crate::postgres_support::{database_error, decode_permission_name};


/// PostgreSQL implementation of the consistency repository port.
#[derive(Clone)]
pub struct PostgresConsistencyRepository {
    pool: PgPool,
}

impl PostgresConsistencyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserLabelRow {
    user_id: Uuid,
    role_label: Option<String>,
    primary_role_id: Option<Uuid>,
    primary_role_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct RoleEdgeRow {
    user_id: Uuid,
    role_id: Uuid,
    role_name: String,
}

impl From<RoleEdgeRow> for RoleSummary {
    fn from(row: RoleEdgeRow) -> Self {
        Self {
            role_id: RoleId::from_uuid(row.role_id),
            name: row.role_name,
        }
    }
}

#[derive(Debug, FromRow)]
struct SyncedGrantRow {
    user_id: Uuid,
    permission: String,
    granted: bool,
}

#[async_trait]
impl ConsistencyRepository for PostgresConsistencyRepository {
    async fn list_user_role_states(&self) -> AppResult<Vec<UserRoleState>> {
        let users = sqlx::query_as::<_, UserLabelRow>(
            r#"
            SELECT
                users.id AS user_id,
                users.role_label,
                users.primary_role_id,
                roles.name AS primary_role_name
            FROM users
            LEFT JOIN roles
                ON roles.id = users.primary_role_id
            ORDER BY users.created_at, users.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list user labels", error))?;

        let edges = sqlx::query_as::<_, RoleEdgeRow>(
            r#"
            SELECT user_roles.user_id, user_roles.role_id, roles.name AS role_name
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            ORDER BY user_roles.created_at, roles.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list role edges", error))?;

        let mut assigned: HashMap<Uuid, Vec<RoleSummary>> = HashMap::new();
        for edge in edges {
            assigned
                .entry(edge.user_id)
                .or_default()
                .push(RoleSummary::from(edge));
        }

        Ok(users
            .into_iter()
            .map(|row| {
                let assigned_roles = assigned.remove(&row.user_id).unwrap_or_default();
                role_state(row, assigned_roles)
            })
            .collect())
    }

    async fn list_synced_grants(&self) -> AppResult<Vec<DirectGrant>> {
        let rows = sqlx::query_as::<_, SyncedGrantRow>(
            r#"
            SELECT user_permissions.user_id, permissions.name AS permission, user_permissions.granted
            FROM user_permissions
            INNER JOIN permissions
                ON permissions.id = user_permissions.permission_id
            WHERE user_permissions.source = 'synced'
            ORDER BY user_permissions.user_id, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list synced grants", error))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(DirectGrant {
                    user_id: UserId::from_uuid(row.user_id),
                    permission: decode_permission_name(row.permission.as_str())?,
                    granted: row.granted,
                    source: GrantSource::Synced,
                })
            })
            .collect())
    }

    async fn repair_user(&self, user_id: UserId) -> AppResult<UserRepair> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| database_error("failed to begin transaction", error))?;

        lock_user(&mut transaction, user_id).await?;
        let plan = load_user_role_state(&mut transaction, user_id)
            .await?
            .repair_plan();

        if let Some(primary) = plan.primary_role.as_ref().filter(|_| plan.insert_edge) {
            insert_role_edge(&mut transaction, user_id, primary.role_id).await?;
        }
        if plan.rewrite_primary_role {
            write_primary_role(
                &mut transaction,
                user_id,
                plan.primary_role.as_ref().map(|role| role.role_id.as_uuid()),
            )
            .await?;
        }
        let stale_grants_removed = prune_stale_synced_grants(&mut transaction, user_id).await?;
        let grants_synced = sync_role_grants(&mut transaction, user_id).await?;

        commit(transaction).await?;

        Ok(UserRepair {
            primary_role: plan.primary_role,
            primary_role_rewritten: plan.rewrite_primary_role,
            edge_inserted: plan.insert_edge,
            stale_grants_removed,
            grants_synced,
        })
    }
}

/// Reads one user's role linkage; the caller holds the user row lock.
async fn load_user_role_state(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> AppResult<UserRoleState> {
    let row = sqlx::query_as::<_, UserLabelRow>(
        r#"
        SELECT
            users.id AS user_id,
            users.role_label,
            users.primary_role_id,
            roles.name AS primary_role_name
        FROM users
        LEFT JOIN roles
            ON roles.id = users.primary_role_id
        WHERE users.id = $1
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to read user label", error))?
    .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

    let edges = sqlx::query_as::<_, RoleEdgeRow>(
        r#"
        SELECT user_roles.user_id, user_roles.role_id, roles.name AS role_name
        FROM user_roles
        INNER JOIN roles
            ON roles.id = user_roles.role_id
        WHERE user_roles.user_id = $1
        ORDER BY user_roles.created_at, roles.name
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to read role edges", error))?;

    Ok(role_state(row, edges.into_iter().map(RoleSummary::from).collect()))
}

async fn insert_role_edge(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    role_id: RoleId,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, role_id) DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(role_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(|error| database_error("failed to insert role edge", error))?;

    Ok(())
}

fn role_state(row: UserLabelRow, assigned_roles: Vec<RoleSummary>) -> UserRoleState {
    UserRoleState {
        user_id: UserId::from_uuid(row.user_id),
        role_label: row.role_label,
        primary_role: row
            .primary_role_id
            .zip(row.primary_role_name)
            .map(|(role_id, name)| RoleSummary {
                role_id: RoleId::from_uuid(role_id),
                name,
            }),
        assigned_roles,
    }
}
