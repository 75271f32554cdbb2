use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use portico_application::SessionSnapshot;
use portico_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::SessionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    Extension(snapshot): Extension<SessionSnapshot>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse::from(snapshot)))
}

/// Re-resolves the caller's permissions and replaces the stored snapshot.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Extension(snapshot): Extension<SessionSnapshot>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    let refreshed = state
        .session_service
        .issue_snapshot(snapshot.user_id)
        .await?;

    session
        .insert(SESSION_USER_KEY, &refreshed)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    info!(
        user_id = %refreshed.user_id,
        before = snapshot.permissions.len(),
        after = refreshed.permissions.len(),
        "session snapshot refreshed"
    );

    Ok(Json(SessionResponse::from(refreshed)))
}
