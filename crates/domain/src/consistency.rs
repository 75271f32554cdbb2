use serde::{Deserialize, Serialize};

use crate::{PermissionName, RoleSummary, UserId};

/// Role linkage of one user as stored, including the legacy label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleState {
    /// User the state belongs to.
    pub user_id: UserId,
    /// Legacy free-text role label.
    pub role_label: Option<String>,
    /// Role the primary-role key points to.
    pub primary_role: Option<RoleSummary>,
    /// Roles linked through assignment edges.
    pub assigned_roles: Vec<RoleSummary>,
}

impl UserRoleState {
    /// Returns the label and edge problems of this user.
    #[must_use]
    pub fn role_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        match (&self.primary_role, self.role_label.as_deref()) {
            (Some(primary), Some(label)) if primary.name != label => {
                issues.push(ConsistencyIssue::LabelMismatch {
                    user_id: self.user_id,
                    role_label: label.to_owned(),
                    primary_role_name: primary.name.clone(),
                });
            }
            (Some(primary), None) => issues.push(ConsistencyIssue::PrimaryRoleWithoutLabel {
                user_id: self.user_id,
                primary_role_name: primary.name.clone(),
            }),
            (None, Some(label)) => issues.push(ConsistencyIssue::LabelWithoutPrimaryRole {
                user_id: self.user_id,
                role_label: label.to_owned(),
            }),
            _ => {}
        }

        if let Some(primary) = &self.primary_role
            && !self
                .assigned_roles
                .iter()
                .any(|role| role.role_id == primary.role_id)
        {
            issues.push(ConsistencyIssue::PrimaryRoleMissingEdge {
                user_id: self.user_id,
                primary_role_name: primary.name.clone(),
            });
        }

        issues
    }

    /// Returns the writes that bring this user back in line.
    ///
    /// The primary role wins over the label; a label alone is resolved against
    /// assigned roles by name and cleared when nothing matches.
    #[must_use]
    pub fn repair_plan(&self) -> RoleRepairPlan {
        let primary_role = match (&self.primary_role, self.role_label.as_deref()) {
            (Some(primary), _) => Some(primary.clone()),
            (None, Some(label)) => self
                .assigned_roles
                .iter()
                .find(|role| role.name == label)
                .cloned(),
            (None, None) => None,
        };

        let rewrite_primary_role = primary_role.as_ref().map(|role| role.name.as_str())
            != self.role_label.as_deref()
            || primary_role.as_ref().map(|role| role.role_id)
                != self.primary_role.as_ref().map(|role| role.role_id);
        let insert_edge = primary_role.as_ref().is_some_and(|primary| {
            !self
                .assigned_roles
                .iter()
                .any(|role| role.role_id == primary.role_id)
        });

        RoleRepairPlan {
            primary_role,
            rewrite_primary_role,
            insert_edge,
        }
    }
}

/// Writes needed to repair one user's role linkage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRepairPlan {
    /// Primary role after repair; the label is derived from its name.
    pub primary_role: Option<RoleSummary>,
    /// Whether the primary role and label columns must be rewritten.
    pub rewrite_primary_role: bool,
    /// Whether the primary role needs an assignment edge.
    pub insert_edge: bool,
}

/// Divergence between the normalized tables and derived data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    /// Legacy label names a different role than the primary-role key.
    LabelMismatch {
        /// Affected user.
        user_id: UserId,
        /// Stored label.
        role_label: String,
        /// Name of the role the key points to.
        primary_role_name: String,
    },
    /// Legacy label is set but no primary role is.
    LabelWithoutPrimaryRole {
        /// Affected user.
        user_id: UserId,
        /// Stored label.
        role_label: String,
    },
    /// Primary role is set but the label is empty.
    PrimaryRoleWithoutLabel {
        /// Affected user.
        user_id: UserId,
        /// Name of the role the key points to.
        primary_role_name: String,
    },
    /// Primary role has no matching assignment edge.
    PrimaryRoleMissingEdge {
        /// Affected user.
        user_id: UserId,
        /// Name of the role the key points to.
        primary_role_name: String,
    },
    /// Materialized grant no longer reachable from the user's roles.
    StaleSyncedGrant {
        /// Affected user.
        user_id: UserId,
        /// Permission of the stale row.
        permission: PermissionName,
    },
}

impl ConsistencyIssue {
    /// Returns the affected user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self {
            Self::LabelMismatch { user_id, .. }
            | Self::LabelWithoutPrimaryRole { user_id, .. }
            | Self::PrimaryRoleWithoutLabel { user_id, .. }
            | Self::PrimaryRoleMissingEdge { user_id, .. }
            | Self::StaleSyncedGrant { user_id, .. } => *user_id,
        }
    }

    /// Returns a stable transport value for the issue kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LabelMismatch { .. } => "label_mismatch",
            Self::LabelWithoutPrimaryRole { .. } => "label_without_primary_role",
            Self::PrimaryRoleWithoutLabel { .. } => "primary_role_without_label",
            Self::PrimaryRoleMissingEdge { .. } => "primary_role_missing_edge",
            Self::StaleSyncedGrant { .. } => "stale_synced_grant",
        }
    }
}
