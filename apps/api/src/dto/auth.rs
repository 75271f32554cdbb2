use portico_application::{SessionPermission, SessionSnapshot};
use portico_domain::Section;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for email and password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Permission entry of the session snapshot.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-permission-response.ts"
)]
pub struct SessionPermissionResponse {
    pub name: String,
    pub display_name: String,
}

/// Navigation entry unlocked by the session snapshot.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/navigation-section-response.ts"
)]
pub struct NavigationSectionResponse {
    pub key: String,
    pub label: String,
    pub route: String,
}

/// Session snapshot as seen by the frontend. Gates UI only.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Option<String>,
    pub is_super_admin: bool,
    pub permissions: Vec<SessionPermissionResponse>,
    pub sections: Vec<NavigationSectionResponse>,
}

impl From<SessionPermission> for SessionPermissionResponse {
    fn from(value: SessionPermission) -> Self {
        Self {
            name: value.name.to_string(),
            display_name: value.display_name,
        }
    }
}

impl From<Section> for NavigationSectionResponse {
    fn from(value: Section) -> Self {
        Self {
            key: value.as_str().to_owned(),
            label: value.label().to_owned(),
            route: value.route().to_owned(),
        }
    }
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(value: SessionSnapshot) -> Self {
        let sections = value
            .visible_sections()
            .into_iter()
            .map(NavigationSectionResponse::from)
            .collect();

        Self {
            user_id: value.user_id.to_string(),
            email: value.email,
            display_name: value.display_name,
            role: value.role,
            is_super_admin: value.is_super_admin,
            permissions: value
                .permissions
                .into_iter()
                .map(SessionPermissionResponse::from)
                .collect(),
            sections,
        }
    }
}
