//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_service;
mod consistency_service;
mod security_admin_ports;
mod security_admin_service;
mod session_service;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{
    AuthorizationPolicy, AuthorizationRepository, AuthorizationService, DEFAULT_SUPER_ADMIN_ROLE,
};
pub use consistency_service::{
    ConsistencyReport, ConsistencyRepository, ConsistencyService, UserRepair,
};
pub use security_admin_ports::{
    AssignRoleInput, CreatePermissionInput, CreateRoleInput, RoleAssignment, RoleChangeOutcome,
    SecurityAdminRepository,
};
pub use security_admin_service::SecurityAdminService;
pub use session_service::{
    PasswordHasher, SessionPermission, SessionService, SessionSnapshot, UserCredentials,
    UserRepository,
};

#[cfg(test)]
mod test_support;
