use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use portico_core::{AppError, UserIdentity};
use portico_domain::{PermissionName, RoleId, UserId, well_known};
use uuid::Uuid;

use crate::dto::{
    AssignRoleRequest, ConsistencyReportResponse, CreatePermissionRequest, CreateRoleRequest,
    DirectGrantResponse, EffectivePermissionsResponse, PermissionResponse,
    ReplacePermissionRequest, ReplaceRolePermissionsRequest, RoleAssignmentResponse,
    RoleChangeResponse, RoleResponse, SetDirectGrantRequest, SyncPermissionsResponse,
};
use crate::error::ApiResult;
use crate::middleware::authorize;
use crate::state::AppState;

mod consistency;
mod permissions;
mod roles;
mod users;

pub use consistency::{audit_consistency_handler, repair_consistency_handler};
pub use permissions::{
    create_permission_handler, list_permissions_handler, replace_permission_handler,
    retire_permission_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, list_roles_handler, replace_role_permissions_handler,
};
pub use users::{
    assign_role_handler, clear_direct_grant_handler, effective_permissions_handler,
    list_direct_grants_handler, list_user_roles_handler, revoke_role_handler,
    set_direct_grant_handler, sync_permissions_handler,
};

fn parse_permission_names(values: Vec<String>) -> ApiResult<Vec<PermissionName>> {
    Ok(values
        .into_iter()
        .map(PermissionName::new)
        .collect::<Result<Vec<_>, _>>()?)
}

fn parse_role_id(value: &str) -> ApiResult<RoleId> {
    Uuid::parse_str(value.trim())
        .map(RoleId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")).into())
}
