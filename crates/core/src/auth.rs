use serde::{Deserialize, Serialize};

use crate::{OrganisationId, UserId};

/// Explicit identity of the caller, persisted in the authenticated session
/// and passed to every service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    organisation_id: OrganisationId,
}

impl CallerIdentity {
    /// Creates a caller identity bound to one active organisation.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        organisation_id: OrganisationId,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            organisation_id,
        }
    }

    /// Returns the authenticated user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the account has one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the organisation the caller is currently acting in.
    #[must_use]
    pub fn organisation_id(&self) -> OrganisationId {
        self.organisation_id
    }

    /// Returns the same caller re-bound to another organisation.
    #[must_use]
    pub fn with_organisation(&self, organisation_id: OrganisationId) -> Self {
        Self {
            organisation_id,
            ..self.clone()
        }
    }
}
