//! Role assignment, overlay management and catalog administration.

use std::sync::Arc;

use portico_core::{AppResult, UserIdentity};
use portico_domain::{AuditAction, UserId};

use crate::{AuditEvent, AuditRepository, AuthorizationService, SecurityAdminRepository};

mod catalog;
mod overlay;
mod roles;


/// Application service for security administration workflows.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn SecurityAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn SecurityAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    async fn require(&self, actor: &UserIdentity, permission: &str) -> AppResult<UserId> {
        let actor_id = UserId::from_uuid(actor.user_id());
        self.authorization_service
            .require_permission(actor_id, permission)
            .await?;
        Ok(actor_id)
    }

    async fn audit(
        &self,
        actor: UserId,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor,
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
