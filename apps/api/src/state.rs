use portico_application::{
    AuthorizationService, ConsistencyService, SecurityAdminService, SessionService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub security_admin_service: SecurityAdminService,
    pub consistency_service: ConsistencyService,
    pub session_service: SessionService,
    pub frontend_url: String,
    pub postgres_pool: PgPool,
}
