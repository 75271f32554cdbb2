use axum::Json;
use axum::extract::Extension;
use portico_application::SessionSnapshot;

use crate::dto::NavigationSectionResponse;

/// Lists the sections unlocked by the caller's session snapshot.
pub async fn navigation_handler(
    Extension(snapshot): Extension<SessionSnapshot>,
) -> Json<Vec<NavigationSectionResponse>> {
    Json(
        snapshot
            .visible_sections()
            .into_iter()
            .map(NavigationSectionResponse::from)
            .collect(),
    )
}
