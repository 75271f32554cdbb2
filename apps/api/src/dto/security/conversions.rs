use portico_application::{ConsistencyReport, RoleAssignment, RoleChangeOutcome};
use portico_domain::{
    ConsistencyIssue, DirectGrant, EffectivePermissions, PermissionDefinition, RoleDefinition,
    UserId,
};

use super::{
    ConsistencyIssueResponse, ConsistencyReportResponse, DirectGrantResponse,
    EffectivePermissionsResponse, PermissionResponse, RoleAssignmentResponse, RoleChangeResponse,
    RoleResponse,
};

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            name: value.name,
            display_name: value.display_name,
            description: value.description,
            is_system: value.is_system,
            permissions: value
                .permissions
                .into_iter()
                .map(|permission| permission.to_string())
                .collect(),
        }
    }
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            permission_id: value.permission_id.to_string(),
            name: value.name.to_string(),
            display_name: value.display_name,
            module: value.module,
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role_id: value.role_id.to_string(),
            role_name: value.role_name,
            is_primary: value.is_primary,
            assigned_at: value.assigned_at,
        }
    }
}

impl From<RoleChangeOutcome> for RoleChangeResponse {
    fn from(value: RoleChangeOutcome) -> Self {
        Self {
            role_id: value.role.role_id.to_string(),
            role_name: value.role.name,
            changed: value.changed,
            primary_role: value.primary_role.map(|role| role.name),
            synced_grants_inserted: value.synced_grants_inserted,
            stale_grants_removed: value.stale_grants_removed,
        }
    }
}

impl From<DirectGrant> for DirectGrantResponse {
    fn from(value: DirectGrant) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            permission: value.permission.to_string(),
            granted: value.granted,
            source: value.source.as_str().to_owned(),
        }
    }
}

impl EffectivePermissionsResponse {
    pub fn new(user_id: UserId, permissions: &EffectivePermissions) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_super_admin: permissions.is_super_admin(),
            permissions: permissions
                .iter()
                .map(|permission| permission.to_string())
                .collect(),
        }
    }
}

impl From<ConsistencyIssue> for ConsistencyIssueResponse {
    fn from(value: ConsistencyIssue) -> Self {
        let kind = value.kind().to_owned();
        let user_id = value.user_id().to_string();
        let (role_label, primary_role_name, permission) = match value {
            ConsistencyIssue::LabelMismatch {
                role_label,
                primary_role_name,
                ..
            } => (Some(role_label), Some(primary_role_name), None),
            ConsistencyIssue::LabelWithoutPrimaryRole { role_label, .. } => {
                (Some(role_label), None, None)
            }
            ConsistencyIssue::PrimaryRoleWithoutLabel {
                primary_role_name, ..
            }
            | ConsistencyIssue::PrimaryRoleMissingEdge {
                primary_role_name, ..
            } => (None, Some(primary_role_name), None),
            ConsistencyIssue::StaleSyncedGrant { permission, .. } => {
                (None, None, Some(permission.to_string()))
            }
        };

        Self {
            kind,
            user_id,
            role_label,
            primary_role_name,
            permission,
        }
    }
}

impl From<ConsistencyReport> for ConsistencyReportResponse {
    fn from(value: ConsistencyReport) -> Self {
        let counts = value
            .counts_by_kind()
            .into_iter()
            .map(|(kind, count)| (kind.to_owned(), count))
            .collect();

        Self {
            users_checked: value.users_checked,
            is_consistent: value.is_consistent(),
            counts,
            issues: value
                .issues
                .into_iter()
                .map(ConsistencyIssueResponse::from)
                .collect(),
        }
    }
}
