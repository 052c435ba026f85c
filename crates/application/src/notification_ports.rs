use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trustgate_core::{AppResult, OrganisationId, UserId};
use trustgate_domain::OnboardingTokenKind;

/// Port for outbound email delivery.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an email. Failures surface as transport errors.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// Claims carried by a signed onboarding token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingClaims {
    /// Invited user.
    #[serde(rename = "id")]
    pub user_id: UserId,
    /// Organisation that issued the trust.
    #[serde(rename = "organisationInvite")]
    pub organisation_id: OrganisationId,
    /// Signup for bare accounts, join for existing ones.
    #[serde(rename = "type")]
    pub kind: OnboardingTokenKind,
}

/// Port for signing and verifying onboarding tokens.
pub trait OnboardingTokenCodec: Send + Sync {
    /// Signs claims into an opaque token.
    fn sign(&self, claims: &OnboardingClaims) -> AppResult<String>;

    /// Verifies a token and returns its claims.
    fn verify(&self, token: &str) -> AppResult<OnboardingClaims>;
}
