//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod consistency;
mod navigation;
mod permission;
mod role;
mod user;

pub use access::EffectivePermissions;
pub use audit::AuditAction;
pub use consistency::{ConsistencyIssue, RoleRepairPlan, UserRoleState};
pub use navigation::{Section, visible_sections};
pub use permission::{
    DirectGrant, GrantSource, PermissionDefinition, PermissionId, PermissionName, well_known,
};
pub use role::{AssignmentMode, RoleDefinition, RoleId, RoleSummary};
pub use user::{EmailAddress, UserAccount, UserId};
