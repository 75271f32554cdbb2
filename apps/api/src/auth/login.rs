use axum::Json;
use axum::extract::State;
use portico_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{LoginRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let snapshot = state
        .session_service
        .authenticate(payload.email.as_str(), payload.password.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_owned()))?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, &snapshot)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    info!(user_id = %snapshot.user_id, "user logged in");

    Ok(Json(SessionResponse::from(snapshot)))
}
