use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use portico_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/refresh", post(auth::refresh_handler))
        .route(
            "/api/navigation",
            get(handlers::navigation::navigation_handler),
        )
        .route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}",
            delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}/permissions",
            put(handlers::security::replace_role_permissions_handler),
        )
        .route(
            "/api/security/permissions",
            get(handlers::security::list_permissions_handler)
                .post(handlers::security::create_permission_handler),
        )
        .route(
            "/api/security/permissions/{name}",
            delete(handlers::security::retire_permission_handler),
        )
        .route(
            "/api/security/permissions/{name}/replace",
            post(handlers::security::replace_permission_handler),
        )
        .route(
            "/api/security/users/{user_id}/roles",
            get(handlers::security::list_user_roles_handler)
                .post(handlers::security::assign_role_handler),
        )
        .route(
            "/api/security/users/{user_id}/roles/{role_id}",
            delete(handlers::security::revoke_role_handler),
        )
        .route(
            "/api/security/users/{user_id}/permissions",
            get(handlers::security::list_direct_grants_handler),
        )
        .route(
            "/api/security/users/{user_id}/permissions/{name}",
            put(handlers::security::set_direct_grant_handler)
                .delete(handlers::security::clear_direct_grant_handler),
        )
        .route(
            "/api/security/users/{user_id}/effective-permissions",
            get(handlers::security::effective_permissions_handler),
        )
        .route(
            "/api/security/users/{user_id}/sync-permissions",
            post(handlers::security::sync_permissions_handler),
        )
        .route(
            "/api/security/consistency",
            get(handlers::security::audit_consistency_handler),
        )
        .route(
            "/api/security/consistency/repair",
            post(handlers::security::repair_consistency_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
