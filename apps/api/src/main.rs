//! Portico API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use portico_core::AppError;
use tracing::{info, warn};

use crate::api_config::{ApiCommand, ApiConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool =
        api_services::connect_and_migrate(&config.database_url, config.database_max_connections)
            .await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::AuditConsistency { repair } => {
            let consistency_service = api_services::build_consistency_service(pool, &config);
            let report = if repair {
                consistency_service.repair(None).await?
            } else {
                consistency_service.audit().await?
            };

            for (kind, count) in report.counts_by_kind() {
                warn!(kind, count, "consistency issues");
            }
            info!(
                users_checked = report.users_checked,
                issues = report.issues.len(),
                repaired = repair,
                "consistency audit finished"
            );
            Ok(())
        }
        ApiCommand::Serve => serve(pool, config).await,
    }
}

async fn serve(pool: sqlx::PgPool, config: ApiConfig) -> Result<(), AppError> {
    let session_layer = api_services::build_postgres_session_layer(
        pool.clone(),
        config.cookie_secure,
        config.session_inactivity_minutes,
    )
    .await?;
    let app_state = api_services::build_app_state(pool, &config);
    let app = api_router::build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "portico-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
