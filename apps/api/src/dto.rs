mod auth;
mod common;
mod security;

pub use auth::{LoginRequest, NavigationSectionResponse, SessionPermissionResponse, SessionResponse};
pub use common::HealthResponse;
pub use security::{
    AssignRoleRequest, ConsistencyIssueResponse, ConsistencyReportResponse,
    CreatePermissionRequest, CreateRoleRequest, DirectGrantResponse, EffectivePermissionsResponse,
    PermissionResponse, ReplacePermissionRequest, ReplaceRolePermissionsRequest,
    RoleAssignmentResponse, RoleChangeResponse, RoleResponse, SetDirectGrantRequest,
    SyncPermissionsResponse,
};
