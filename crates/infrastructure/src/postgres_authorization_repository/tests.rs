use std::sync::Arc;

use portico_application::{AuthorizationPolicy, AuthorizationRepository, AuthorizationService};
use portico_domain::{GrantSource, PermissionName, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresAuthorizationRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres authorization tests: {error}");
    }

    Some(pool)
}

async fn insert_user_with_role(pool: &PgPool, role_name: &str) -> UserId {
    let user_id = Uuid::new_v4();
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, email, display_name, role_label, primary_role_id)
            SELECT $1, $2, 'Test User', roles.name, roles.id
            FROM roles
            WHERE roles.name = $3
            "#,
    )
    .bind(user_id)
    .bind(format!("{user_id}@example.org"))
    .bind(role_name)
    .execute(pool)
    .await;
    assert!(insert.is_ok_and(|result| result.rows_affected() == 1));

    let link = sqlx::query(
        r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
    )
    .bind(user_id)
    .bind(role_name)
    .execute(pool)
    .await;
    assert!(link.is_ok());

    UserId::from_uuid(user_id)
}

async fn insert_overlay(pool: &PgPool, user_id: UserId, name: &str, granted: bool, source: GrantSource) {
    let insert = sqlx::query(
        r#"
            INSERT INTO user_permissions (user_id, permission_id, granted, source)
            SELECT $1, id, $3, $4 FROM permissions WHERE name = $2
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(name)
    .bind(granted)
    .bind(source.as_str())
    .execute(pool)
    .await;
    assert!(insert.is_ok());
}

fn service(pool: &PgPool) -> AuthorizationService {
    AuthorizationService::new(
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        AuthorizationPolicy::default(),
    )
}

#[tokio::test]
async fn seeded_super_admin_resolves_to_catalog() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let user_id = insert_user_with_role(&pool, "super_admin").await;
    let repository = PostgresAuthorizationRepository::new(pool.clone());
    let catalog = repository
        .list_permission_catalog()
        .await
        .unwrap_or_default();

    let effective = service(&pool)
        .resolve_effective_permissions(user_id)
        .await
        .unwrap_or_default();
    assert!(effective.is_super_admin());
    assert_eq!(effective.len(), catalog.len());
}

#[tokio::test]
async fn overlay_rows_follow_their_source() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let user_id = insert_user_with_role(&pool, "blogger").await;
    insert_overlay(&pool, user_id, "settings.edit", true, GrantSource::Synced).await;
    insert_overlay(&pool, user_id, "analytics.view", true, GrantSource::Explicit).await;
    insert_overlay(&pool, user_id, "jobs.publish", false, GrantSource::Explicit).await;

    let service = service(&pool);
    let effective = service
        .resolve_effective_permissions(user_id)
        .await
        .unwrap_or_default();

    assert!(!effective.contains("settings.edit"));
    assert!(effective.contains("analytics.view"));
    assert!(!effective.contains("jobs.publish"));
    assert_eq!(effective.len(), 15);

    assert!(!service.has_permission(user_id, "settings.edit").await.unwrap_or(true));
    assert!(!service.has_permission(user_id, "jobs.publish").await.unwrap_or(true));
    assert!(service.has_permission(user_id, "content.publish").await.unwrap_or(false));
}

#[tokio::test]
async fn direct_grant_lookup_decodes_source() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let user_id = insert_user_with_role(&pool, "blogger").await;
    insert_overlay(&pool, user_id, "content.view", true, GrantSource::Synced).await;

    let repository = PostgresAuthorizationRepository::new(pool.clone());
    let name = PermissionName::new("content.view").unwrap_or_else(|error| panic!("{error}"));
    let grant = repository
        .find_direct_grant(user_id, &name)
        .await
        .unwrap_or_default();
    assert!(grant.is_some_and(|grant| grant.source == GrantSource::Synced));

    let roles = repository.list_roles_for_user(user_id).await.unwrap_or_default();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "blogger");
}

#[tokio::test]
async fn unknown_user_has_no_account() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthorizationRepository::new(pool.clone());
    let account = repository.find_user(UserId::new()).await;
    assert!(matches!(account, Ok(None)));
}
