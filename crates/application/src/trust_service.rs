//! Trust issuance, invitation and lifecycle.

mod invite;
mod lifecycle;


use std::sync::Arc;

use trustgate_core::{AppError, AppResult, CallerIdentity, OrganisationId};
use trustgate_domain::{
    AuditAction, OnboardingTokenKind, Organisation, PermissionId, RoleId, Trust, User,
};

use crate::ownership::{dedup_ids, ensure_permissions_owned, ensure_roles_owned};
use crate::{
    AccessControlRepository, AuditEvent, AuditRepository, AuthorizationService, DeliveryOutcome,
    NewTrust, NotificationDispatcher, OrganisationMember, OrganisationRepository, TrustChanges,
    TrustRepository, UserRepository,
};

/// Roles, permissions and type granted by a new trust.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustGrant {
    /// Free-form membership type.
    pub trust_type: Option<String>,
    /// Roles of the issuing organisation.
    pub role_ids: Vec<RoleId>,
    /// Permissions of the issuing organisation.
    pub permission_ids: Vec<PermissionId>,
}

/// Request to invite someone by email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInvite {
    /// Email of the invitee.
    pub email: Option<String>,
    /// Name used when a new account has to be created.
    pub name: Option<String>,
    /// Grants of the new trust.
    pub grant: TrustGrant,
}

/// Partial trust update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustUpdate {
    /// Replacement membership type.
    pub trust_type: Option<String>,
    /// Replacement role set.
    pub role_ids: Option<Vec<RoleId>>,
    /// Replacement permission set.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// New deactivation flag.
    pub inactive: Option<bool>,
}

/// Result of an invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitedMember {
    /// Invited user and their pending trust.
    pub member: OrganisationMember,
    /// Whether the user has to sign up or only join.
    pub token_kind: OnboardingTokenKind,
    /// What happened to the invitation email.
    pub delivery: DeliveryOutcome,
}

/// Application service for the trust and invitation workflow.
#[derive(Clone)]
pub struct TrustService {
    authorization_service: AuthorizationService,
    organisation_repository: Arc<dyn OrganisationRepository>,
    user_repository: Arc<dyn UserRepository>,
    trust_repository: Arc<dyn TrustRepository>,
    access_control_repository: Arc<dyn AccessControlRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    notification_dispatcher: NotificationDispatcher,
}

impl TrustService {
    /// Creates a new trust service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        organisation_repository: Arc<dyn OrganisationRepository>,
        user_repository: Arc<dyn UserRepository>,
        trust_repository: Arc<dyn TrustRepository>,
        access_control_repository: Arc<dyn AccessControlRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        notification_dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            authorization_service,
            organisation_repository,
            user_repository,
            trust_repository,
            access_control_repository,
            audit_repository,
            notification_dispatcher,
        }
    }

    /// Resolves the caller's organisation and checks the caller belongs to it.
    async fn issuing_organisation(&self, caller: &CallerIdentity) -> AppResult<Organisation> {
        let organisation = self
            .organisation_repository
            .find_organisation(caller.organisation_id())
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "organisation '{}' does not exist",
                    caller.organisation_id()
                ))
            })?;

        self.authorization_service.require_member(caller).await?;

        Ok(organisation)
    }

    async fn ensure_grants_owned(
        &self,
        organisation_id: OrganisationId,
        role_ids: &[RoleId],
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        ensure_roles_owned(
            self.access_control_repository.as_ref(),
            organisation_id,
            role_ids,
        )
        .await?;
        ensure_permissions_owned(
            self.access_control_repository.as_ref(),
            organisation_id,
            permission_ids,
        )
        .await
    }

    async fn issue_trust(
        &self,
        caller: &CallerIdentity,
        organisation: &Organisation,
        user: &User,
        grant: TrustGrant,
    ) -> AppResult<Trust> {
        if self
            .trust_repository
            .find_trust(user.id, organisation.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user '{}' is already trusted by organisation '{}'",
                user.email, organisation.name
            )));
        }

        let trust = self
            .trust_repository
            .create_trust(NewTrust {
                user_id: user.id,
                organisation_id: organisation.id,
                trust_type: grant.trust_type,
                issued_by: caller.user_id(),
                role_ids: dedup_ids(&grant.role_ids),
                permission_ids: dedup_ids(&grant.permission_ids),
            })
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organisation_id: organisation.id,
                subject: caller.user_id().to_string(),
                action: AuditAction::TrustCreated,
                resource_type: "trust".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some(format!(
                    "trusted '{}' with {} roles and {} permissions",
                    user.email,
                    trust.role_ids.len(),
                    trust.permission_ids.len()
                )),
            })
            .await?;

        Ok(trust)
    }
}
