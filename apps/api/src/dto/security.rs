use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload replacing every grant of a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/replace-role-permissions-request.ts"
)]
pub struct ReplaceRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// API representation of a role and its grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_system: bool,
    pub permissions: Vec<String>,
}

/// Incoming payload for adding a catalog permission.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub display_name: String,
}

/// Incoming payload for moving every grant of a permission to a new one.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/replace-permission-request.ts"
)]
pub struct ReplacePermissionRequest {
    pub replacement: CreatePermissionRequest,
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub name: String,
    pub display_name: String,
    pub module: String,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
    /// `replace` (default) or `add`.
    #[serde(default)]
    pub mode: Option<String>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub is_primary: bool,
    pub assigned_at: String,
}

/// Result of a role assignment or revocation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-change-response.ts"
)]
pub struct RoleChangeResponse {
    pub role_id: String,
    pub role_name: String,
    pub changed: bool,
    pub primary_role: Option<String>,
    #[ts(type = "number")]
    pub synced_grants_inserted: u64,
    #[ts(type = "number")]
    pub stale_grants_removed: u64,
}

/// Incoming payload for an explicit per-user override.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-direct-grant-request.ts"
)]
pub struct SetDirectGrantRequest {
    pub granted: bool,
}

/// API representation of one overlay row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/direct-grant-response.ts"
)]
pub struct DirectGrantResponse {
    pub user_id: String,
    pub permission: String,
    pub granted: bool,
    pub source: String,
}

/// Effective permission set of a user resolved from current data.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub user_id: String,
    pub is_super_admin: bool,
    pub permissions: Vec<String>,
}

/// Number of overlay rows materialized by a sync.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-permissions-response.ts"
)]
pub struct SyncPermissionsResponse {
    #[ts(type = "number")]
    pub inserted: u64,
}

/// One divergence between normalized role data and derived data.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/consistency-issue-response.ts"
)]
pub struct ConsistencyIssueResponse {
    pub kind: String,
    pub user_id: String,
    pub role_label: Option<String>,
    pub primary_role_name: Option<String>,
    pub permission: Option<String>,
}

/// Consistency audit or repair report.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/consistency-report-response.ts"
)]
pub struct ConsistencyReportResponse {
    pub users_checked: usize,
    pub is_consistent: bool,
    pub counts: BTreeMap<String, usize>,
    pub issues: Vec<ConsistencyIssueResponse>,
}
