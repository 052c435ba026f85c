//! Organisation-scoped administration of roles, permissions and policies.

mod permissions;
mod policies;
mod roles;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use trustgate_core::{AppResult, CallerIdentity};
use trustgate_domain::AuditAction;

use crate::{
    AccessControlRepository, ApplicationRepository, AuditEvent, AuditRepository,
    AuthorizationService,
};

/// Application service for the access-control catalogue of an organisation.
///
/// Every operation requires an active trust in the caller's organisation
/// and only ever touches rows owned by that organisation.
#[derive(Clone)]
pub struct AccessControlService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AccessControlRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccessControlService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AccessControlRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            application_repository,
            audit_repository,
        }
    }

    async fn audit(
        &self,
        caller: &CallerIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organisation_id: caller.organisation_id(),
                subject: caller.user_id().to_string(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
