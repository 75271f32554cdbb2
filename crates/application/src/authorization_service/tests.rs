use std::sync::Arc;

use portico_core::AppError;
use portico_domain::{GrantSource, Section, UserId};

use crate::test_support::{BLOGGER_PERMISSIONS, FakeStore, PORTAL_CATALOG};

use super::{AuthorizationPolicy, AuthorizationService};

async fn portal() -> Arc<FakeStore> {
    FakeStore::with_catalog(PORTAL_CATALOG).await
}

async fn names(service: &AuthorizationService, user_id: UserId) -> Vec<String> {
    service
        .resolve_effective_permissions(user_id)
        .await
        .map(|permissions| permissions.iter().map(ToString::to_string).collect())
        .unwrap_or_else(|error| panic!("{error}"))
}

#[tokio::test]
async fn blogger_resolves_to_role_grants() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    let service = store.authorization_service();

    let mut expected: Vec<String> = BLOGGER_PERMISSIONS.iter().map(|v| (*v).to_owned()).collect();
    expected.sort();
    assert_eq!(names(&service, user).await, expected);
    assert_eq!(expected.len(), 15);

    assert!(
        !service
            .has_permission(user, "content.delete")
            .await
            .unwrap_or(true)
    );
    assert!(
        !service
            .has_permission(user, "users.view")
            .await
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn blogger_sections_are_the_five_content_areas() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;

    let sections = store
        .authorization_service()
        .resolve_visible_sections(user)
        .await
        .unwrap_or_default();

    assert_eq!(
        sections,
        vec![
            Section::Overview,
            Section::Content,
            Section::Jobs,
            Section::Scholarships,
            Section::Newsletter,
        ]
    );
}

#[tokio::test]
async fn super_admin_holds_catalog_even_without_role_grants() {
    let store = portal().await;
    let super_admin = store.add_role("super_admin", true, &[]).await;
    let user = store.add_user("root@example.org").await;
    store.link_role(user, super_admin).await;
    store
        .insert_grant(user, "users.manage", false, GrantSource::Explicit)
        .await;
    let service = store.authorization_service();

    let permissions = service.resolve_effective_permissions(user).await;
    assert!(permissions.is_ok());
    let permissions = permissions.unwrap_or_default();
    assert!(permissions.is_super_admin());
    assert_eq!(permissions.len(), PORTAL_CATALOG.len());

    assert!(
        service
            .has_permission(user, "users.manage")
            .await
            .unwrap_or(false)
    );
    let sections = service.resolve_visible_sections(user).await.unwrap_or_default();
    assert_eq!(sections.len(), Section::all().len());
}

#[tokio::test]
async fn legacy_label_alone_never_grants_bypass() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    store
        .set_raw_labels(user, Some("super_admin"), Some(blogger))
        .await;
    let service = store.authorization_service();

    let permissions = service
        .resolve_effective_permissions(user)
        .await
        .unwrap_or_default();
    assert!(!permissions.is_super_admin());
    assert!(!permissions.contains("settings.edit"));
}

#[tokio::test]
async fn configured_super_admin_roles_are_honored() {
    let store = portal().await;
    let owner = store.add_role("owner", true, &[]).await;
    let user = store.add_user("owner@example.org").await;
    store.link_role(user, owner).await;

    let default_policy = store.authorization_service();
    assert!(
        !default_policy
            .has_permission(user, "settings.edit")
            .await
            .unwrap_or(true)
    );

    let custom = AuthorizationService::new(store.clone(), AuthorizationPolicy::new(["owner"]));
    assert!(
        custom
            .has_permission(user, "settings.edit")
            .await
            .unwrap_or(false)
    );
}

#[tokio::test]
async fn explicit_deny_overrides_role_grant() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    store
        .insert_grant(user, "jobs.publish", false, GrantSource::Explicit)
        .await;
    let service = store.authorization_service();

    assert!(!names(&service, user).await.contains(&"jobs.publish".to_owned()));
    assert!(
        !service
            .has_permission(user, "jobs.publish")
            .await
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn explicit_grant_adds_permission_outside_roles() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    store
        .insert_grant(user, "analytics.view", true, GrantSource::Explicit)
        .await;
    let service = store.authorization_service();

    assert!(
        service
            .has_permission(user, "analytics.view")
            .await
            .unwrap_or(false)
    );
    let sections = service.resolve_visible_sections(user).await.unwrap_or_default();
    assert!(sections.contains(&Section::Analytics));
}

#[tokio::test]
async fn synced_rows_never_grant_or_deny() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    store
        .insert_grant(user, "settings.edit", true, GrantSource::Synced)
        .await;
    store
        .insert_grant(user, "content.view", false, GrantSource::Synced)
        .await;
    let service = store.authorization_service();

    let resolved = names(&service, user).await;
    assert!(!resolved.contains(&"settings.edit".to_owned()));
    assert!(resolved.contains(&"content.view".to_owned()));
    assert!(
        !service
            .has_permission(user, "settings.edit")
            .await
            .unwrap_or(true)
    );
    assert!(
        service
            .has_permission(user, "content.view")
            .await
            .unwrap_or(false)
    );
}

#[tokio::test]
async fn multiple_roles_union_their_grants() {
    let store = portal().await;
    let writer = store.add_role("writer", false, &["content.view"]).await;
    let analyst = store.add_role("analyst", false, &["analytics.view"]).await;
    let user = store.add_user("both@example.org").await;
    store.link_role(user, writer).await;
    store.link_role(user, analyst).await;

    assert_eq!(
        names(&store.authorization_service(), user).await,
        vec!["analytics.view".to_owned(), "content.view".to_owned()]
    );
}

#[tokio::test]
async fn grants_outside_catalog_are_dropped() {
    let store = portal().await;
    let stale = store
        .add_role("stale", false, &["content.view", "legacy.export"])
        .await;
    let user = store.add_user("stale@example.org").await;
    store.link_role(user, stale).await;
    let service = store.authorization_service();

    assert_eq!(names(&service, user).await, vec!["content.view".to_owned()]);
    assert!(
        !service
            .has_permission(user, "legacy.export")
            .await
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn unknown_user_resolves_to_empty_set() {
    let store = portal().await;
    let service = store.authorization_service();
    let stranger = UserId::new();

    let permissions = service
        .resolve_effective_permissions(stranger)
        .await
        .unwrap_or_else(|error| panic!("{error}"));
    assert!(permissions.is_empty());
    assert!(
        !service
            .has_permission(stranger, "dashboard.view")
            .await
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn user_without_roles_has_nothing() {
    let store = portal().await;
    let user = store.add_user("new@example.org").await;
    let service = store.authorization_service();

    assert!(names(&service, user).await.is_empty());
    assert!(
        service
            .resolve_visible_sections(user)
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn malformed_permission_names_are_not_held() {
    let store = portal().await;
    let super_admin = store.add_role("super_admin", true, &[]).await;
    let user = store.add_user("root@example.org").await;
    store.link_role(user, super_admin).await;
    let service = store.authorization_service();

    for value in ["", "content", "Content.View", "not.in_catalog"] {
        assert!(
            !service.has_permission(user, value).await.unwrap_or(true),
            "{value} was held"
        );
    }
}

#[tokio::test]
async fn require_permission_error_is_generic() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    let service = store.authorization_service();

    assert!(
        service
            .require_permission(user, "content.edit")
            .await
            .is_ok()
    );

    let denied = service.require_permission(user, "roles.manage").await;
    match denied {
        Err(AppError::Forbidden(message)) => {
            assert_eq!(message, "insufficient permissions");
            assert!(!message.contains("roles"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn storage_outage_propagates_as_unavailable() {
    let store = portal().await;
    let blogger = store.add_role("blogger", false, BLOGGER_PERMISSIONS).await;
    let user = store.add_user("writer@example.org").await;
    store.link_role(user, blogger).await;
    store.set_unavailable(true).await;
    let service = store.authorization_service();

    let resolved = service.resolve_effective_permissions(user).await;
    assert!(matches!(resolved, Err(AppError::Unavailable(_))));

    let required = service.require_permission(user, "content.view").await;
    assert!(required.is_err_and(|error| error.is_transient()));

    store.set_unavailable(false).await;
    assert_eq!(names(&service, user).await.len(), 15);
}
