use trustgate_domain::OnboardingTokenKind;
use url::Url;

use super::InviteNotice;

const PRODUCT_NAME: &str = "Trustgate";

/// Rendered invitation email. Invitations are sent as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteMessage {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
}

pub(super) fn compose(notice: &InviteNotice<'_>, link: &Url) -> InviteMessage {
    let recipient = notice.recipient.display_name();
    let organisation = notice.organisation.name.as_str();
    let issuer = notice.issuer_name;

    let (subject, action) = match notice.kind {
        OnboardingTokenKind::Signup => (
            format!("You've been invited to join {PRODUCT_NAME}"),
            "Create your account",
        ),
        OnboardingTokenKind::Join => (
            format!("You've been invited to join {organisation} on {PRODUCT_NAME}"),
            "Join the organisation",
        ),
    };

    let text_body = format!(
        "Kia ora {recipient},\n\n\
         {issuer} has invited you to join {organisation} on {PRODUCT_NAME}.\n\n\
         {action}: {link}\n"
    );

    InviteMessage { subject, text_body }
}
