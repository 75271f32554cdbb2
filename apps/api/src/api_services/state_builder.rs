use std::sync::Arc;

use portico_application::{
    AuthorizationPolicy, AuthorizationService, ConsistencyService, SecurityAdminService,
    SessionService,
};
use portico_infrastructure::{
    Argon2PasswordHasher, PostgresAuditRepository, PostgresAuthorizationRepository,
    PostgresConsistencyRepository, PostgresSecurityAdminRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

fn build_authorization_service(pool: &PgPool, config: &ApiConfig) -> AuthorizationService {
    let policy = AuthorizationPolicy::new(config.super_admin_roles.iter().cloned());
    info!(
        super_admin_roles = ?policy.super_admin_roles().collect::<Vec<_>>(),
        "authorization policy loaded"
    );

    AuthorizationService::new(
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        policy,
    )
}

pub fn build_consistency_service(pool: PgPool, config: &ApiConfig) -> ConsistencyService {
    ConsistencyService::new(
        build_authorization_service(&pool, config),
        Arc::new(PostgresConsistencyRepository::new(pool.clone())),
        Arc::new(PostgresAuditRepository::new(pool)),
    )
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let authorization_service = build_authorization_service(&pool, config);
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));

    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        Arc::new(PostgresSecurityAdminRepository::new(pool.clone())),
        audit_repository.clone(),
    );
    let consistency_service = ConsistencyService::new(
        authorization_service.clone(),
        Arc::new(PostgresConsistencyRepository::new(pool.clone())),
        audit_repository,
    );
    let session_service = SessionService::new(
        authorization_service.clone(),
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
    );

    AppState {
        authorization_service,
        security_admin_service,
        consistency_service,
        session_service,
        frontend_url: config.frontend_url.clone(),
        postgres_pool: pool,
    }
}
