//! Fire-and-forget delivery of invitation emails.
//!
//! Delivery never fails the calling operation: a missing transport, a token
//! that cannot be signed and a refused send are all logged and reported as a
//! [`DeliveryOutcome`].

mod message;


use std::sync::Arc;

use tracing::{error, info, warn};
use trustgate_core::{AppError, AppResult};
use trustgate_domain::{OnboardingTokenKind, Organisation, User};
use url::Url;

use crate::{EmailService, OnboardingClaims, OnboardingTokenCodec};

pub use message::InviteMessage;

/// What happened to an invitation email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message.
    Sent,
    /// No transport is configured.
    Skipped,
    /// Signing or sending failed.
    Failed,
}

/// Invitation to notify about.
#[derive(Debug, Clone, Copy)]
pub struct InviteNotice<'a> {
    /// Invited user.
    pub recipient: &'a User,
    /// Display name of the inviting user.
    pub issuer_name: &'a str,
    /// Inviting organisation.
    pub organisation: &'a Organisation,
    /// Signup for bare accounts, join for existing ones.
    pub kind: OnboardingTokenKind,
}

/// Composes and sends invitation emails carrying a signed onboarding token.
#[derive(Clone)]
pub struct NotificationDispatcher {
    email_service: Option<Arc<dyn EmailService>>,
    token_codec: Arc<dyn OnboardingTokenCodec>,
    onboarding_base_url: Url,
}

impl NotificationDispatcher {
    /// Creates a dispatcher. `email_service` is `None` when email is disabled.
    #[must_use]
    pub fn new(
        email_service: Option<Arc<dyn EmailService>>,
        token_codec: Arc<dyn OnboardingTokenCodec>,
        onboarding_base_url: Url,
    ) -> Self {
        Self {
            email_service,
            token_codec,
            onboarding_base_url,
        }
    }

    /// Returns the codec used to sign and verify onboarding tokens.
    #[must_use]
    pub fn token_codec(&self) -> &Arc<dyn OnboardingTokenCodec> {
        &self.token_codec
    }

    /// Signs a token and sends the invitation. Never returns an error.
    pub async fn dispatch_invite(&self, notice: InviteNotice<'_>) -> DeliveryOutcome {
        let Some(email_service) = &self.email_service else {
            warn!(
                user_id = %notice.recipient.id,
                organisation_id = %notice.organisation.id,
                "no email transport configured, invitation not sent"
            );
            return DeliveryOutcome::Skipped;
        };

        let message = match self.compose_invite(&notice) {
            Ok(message) => message,
            Err(error) => {
                error!(%error, user_id = %notice.recipient.id, "failed to compose invitation");
                return DeliveryOutcome::Failed;
            }
        };

        match email_service
            .send_email(
                &notice.recipient.email,
                &message.subject,
                &message.text_body,
                None,
            )
            .await
        {
            Ok(()) => {
                info!(
                    user_id = %notice.recipient.id,
                    organisation_id = %notice.organisation.id,
                    kind = notice.kind.as_str(),
                    "invitation sent"
                );
                DeliveryOutcome::Sent
            }
            Err(error) => {
                error!(%error, user_id = %notice.recipient.id, "failed to send invitation");
                DeliveryOutcome::Failed
            }
        }
    }

    /// Builds the invitation, signing a fresh token.
    pub fn compose_invite(&self, notice: &InviteNotice<'_>) -> AppResult<InviteMessage> {
        let token = self.token_codec.sign(&OnboardingClaims {
            user_id: notice.recipient.id,
            organisation_id: notice.organisation.id,
            kind: notice.kind,
        })?;
        let link = self.onboarding_link(notice.kind, &token)?;

        Ok(message::compose(notice, &link))
    }

    /// Builds the onboarding link for a token.
    pub fn onboarding_link(&self, kind: OnboardingTokenKind, token: &str) -> AppResult<Url> {
        let mut link = self
            .onboarding_base_url
            .join(kind.link_path())
            .map_err(|error| {
                AppError::Internal(format!("failed to build onboarding link: {error}"))
            })?;
        link.query_pairs_mut().append_pair("token", token);

        Ok(link)
    }
}
