use tracing::info;
use trustgate_core::UserId;
use trustgate_domain::EmailAddress;

use super::*;

impl TrustService {
    /// Issues a pending trust from the caller's organisation to an existing user.
    ///
    /// Fails with `Unauthorized` when the caller's organisation does not
    /// exist, `NotFound` when the user or a referenced grant is unknown, and
    /// `Conflict` when the pair already has a trust.
    pub async fn create_trust(
        &self,
        caller: &CallerIdentity,
        email: &str,
        grant: TrustGrant,
    ) -> AppResult<Trust> {
        let organisation = self.issuing_organisation(caller).await?;
        let email = EmailAddress::new(email)?;
        let user = self
            .user_repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("no user account exists for '{}'", email.as_str()))
            })?;

        self.ensure_grants_owned(organisation.id, &grant.role_ids, &grant.permission_ids)
            .await?;

        let trust = self.issue_trust(caller, &organisation, &user, grant).await?;
        info!(
            user_id = %user.id,
            organisation_id = %organisation.id,
            "trust created"
        );

        Ok(trust)
    }

    /// Updates the trust a user holds in the caller's organisation.
    pub async fn update_trust(
        &self,
        caller: &CallerIdentity,
        user_id: UserId,
        update: TrustUpdate,
    ) -> AppResult<OrganisationMember> {
        self.authorization_service.require_member(caller).await?;
        let organisation_id = caller.organisation_id();

        if self
            .trust_repository
            .find_trust(user_id, organisation_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' has no trust in organisation '{organisation_id}'"
            )));
        }

        let role_ids = update.role_ids.as_deref().map(dedup_ids);
        let permission_ids = update.permission_ids.as_deref().map(dedup_ids);
        self.ensure_grants_owned(
            organisation_id,
            role_ids.as_deref().unwrap_or_default(),
            permission_ids.as_deref().unwrap_or_default(),
        )
        .await?;

        let trust = self
            .trust_repository
            .update_trust(
                user_id,
                organisation_id,
                TrustChanges {
                    trust_type: update.trust_type,
                    role_ids,
                    permission_ids,
                    inactive: update.inactive,
                    modified_by: caller.user_id(),
                },
            )
            .await?;

        let user = self
            .user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        self.audit_repository
            .append_event(AuditEvent {
                organisation_id,
                subject: caller.user_id().to_string(),
                action: AuditAction::TrustUpdated,
                resource_type: "trust".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "updated trust of '{}' (inactive: {})",
                    user.email, trust.inactive
                )),
            })
            .await?;

        Ok(OrganisationMember { user, trust })
    }

    /// Marks the user's trust in an organisation as accepted.
    pub async fn accept_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Trust> {
        let trust = self
            .trust_repository
            .accept_trust(user_id, organisation_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organisation_id,
                subject: user_id.to_string(),
                action: AuditAction::TrustAccepted,
                resource_type: "trust".to_owned(),
                resource_id: user_id.to_string(),
                detail: None,
            })
            .await?;

        info!(%user_id, %organisation_id, "trust accepted");
        Ok(trust)
    }
}
