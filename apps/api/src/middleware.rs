use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use portico_application::SessionSnapshot;
use portico_core::{AppError, UserIdentity};
use portico_domain::UserId;
use tower_sessions::Session;
use tracing::warn;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Loads the session snapshot and exposes it, with its identity, as request
/// extensions.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let snapshot = session
        .get::<SessionSnapshot>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session snapshot: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(snapshot.identity());
    request.extensions_mut().insert(snapshot);
    Ok(next.run(request).await)
}

/// Checks a permission against current data before a handler runs.
///
/// Any failure of the check itself is answered with 403.
pub async fn authorize(
    state: &AppState,
    identity: &UserIdentity,
    permission: &str,
) -> ApiResult<()> {
    state
        .authorization_service
        .require_permission(UserId::from_uuid(identity.user_id()), permission)
        .await
        .map_err(|error| fail_closed(identity, permission, error).into())
}

fn fail_closed(identity: &UserIdentity, permission: &str, error: AppError) -> AppError {
    match error {
        AppError::Forbidden(_) => error,
        other => {
            warn!(
                user_id = %identity.user_id(),
                permission,
                error = %other,
                "permission check failed; denying request"
            );
            AppError::Forbidden("insufficient permissions".to_owned())
        }
    }
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !origin_is_allowed(origin, referer, &state.frontend_url) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn origin_is_allowed(origin: &str, referer: &str, allowed_origin: &str) -> bool {
    origin == allowed_origin || referer.starts_with(allowed_origin)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
