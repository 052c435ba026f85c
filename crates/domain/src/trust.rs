use std::str::FromStr;

use serde::{Deserialize, Serialize};
use trustgate_core::{AppError, OrganisationId, UserId};

use crate::{PermissionId, RoleId};

/// Membership record linking one user to one organisation.
///
/// Exactly one trust exists per `(user_id, organisation_id)` pair. Trusts are
/// never deleted; they are deactivated through `inactive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trust {
    /// Trusted user.
    pub user_id: UserId,
    /// Issuing organisation.
    pub organisation_id: OrganisationId,
    /// Free-form membership type chosen by the issuer.
    pub trust_type: Option<String>,
    /// Set once onboarding completes.
    pub accepted: bool,
    /// Orthogonal deactivation flag.
    pub inactive: bool,
    /// Roles granted through this trust.
    pub role_ids: Vec<RoleId>,
    /// Permissions granted directly through this trust.
    pub permission_ids: Vec<PermissionId>,
    /// User who issued the invitation.
    pub issued_by: Option<UserId>,
}

impl Trust {
    /// Returns the acceptance state of the trust.
    #[must_use]
    pub fn state(&self) -> TrustState {
        if self.accepted {
            TrustState::Active
        } else {
            TrustState::Pending
        }
    }

    /// Returns whether the trust currently grants anything.
    #[must_use]
    pub fn grants_access(&self) -> bool {
        self.state() == TrustState::Active && !self.inactive
    }
}

/// Acceptance state of a trust. `inactive` is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustState {
    /// Invited, onboarding not completed.
    Pending,
    /// Onboarding completed.
    Active,
}

impl TrustState {
    /// Returns a stable transport value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

/// Kind of onboarding token embedded in an invite link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnboardingTokenKind {
    /// The account was created by this invite and still needs a password.
    #[serde(rename = "signup-token")]
    Signup,
    /// The account existed before the invite.
    #[serde(rename = "join-token")]
    Join,
}

impl OnboardingTokenKind {
    /// Returns the token type claim value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup-token",
            Self::Join => "join-token",
        }
    }

    /// Returns the frontend path the invite link points to.
    #[must_use]
    pub fn link_path(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Join => "join",
        }
    }
}

impl FromStr for OnboardingTokenKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "signup-token" => Ok(Self::Signup),
            "join-token" => Ok(Self::Join),
            _ => Err(AppError::Validation(format!(
                "unknown onboarding token type '{value}'"
            ))),
        }
    }
}
