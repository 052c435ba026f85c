use trustgate_domain::EmailAddress;

use super::*;
use crate::InviteNotice;

impl TrustService {
    /// Invites someone into the caller's organisation by email.
    ///
    /// A bare account is created when the email is unknown and the invitee
    /// receives a signup link; existing users receive a join link. The
    /// trust is persisted before any email is attempted and delivery
    /// problems never fail the invitation.
    pub async fn invite_member(
        &self,
        caller: &CallerIdentity,
        invite: MemberInvite,
    ) -> AppResult<InvitedMember> {
        let email = invite
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                AppError::Validation("an email address is required to invite a member".to_owned())
            })
            .and_then(EmailAddress::new)?;

        let organisation = self.issuing_organisation(caller).await?;
        self.ensure_grants_owned(
            organisation.id,
            &invite.grant.role_ids,
            &invite.grant.permission_ids,
        )
        .await?;

        let (user, token_kind) = match self.user_repository.find_user_by_email(&email).await? {
            Some(user) => (user, OnboardingTokenKind::Join),
            None => {
                let name = invite
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty());
                let user = self.user_repository.create_user(&email, name).await?;
                (user, OnboardingTokenKind::Signup)
            }
        };

        let trust = self
            .issue_trust(caller, &organisation, &user, invite.grant)
            .await?;

        let issuer_name = self
            .user_repository
            .find_user(caller.user_id())
            .await?
            .map(|issuer| issuer.display_name().to_owned())
            .unwrap_or_else(|| caller.display_name().to_owned());

        let delivery = self
            .notification_dispatcher
            .dispatch_invite(InviteNotice {
                recipient: &user,
                issuer_name: &issuer_name,
                organisation: &organisation,
                kind: token_kind,
            })
            .await;

        Ok(InvitedMember {
            member: OrganisationMember { user, trust },
            token_kind,
            delivery,
        })
    }
}
