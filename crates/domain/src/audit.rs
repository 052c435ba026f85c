use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// An organisation was bootstrapped.
    OrganisationCreated,
    /// An organisation was renamed.
    OrganisationRenamed,
    /// An application was installed into an organisation.
    ApplicationInstalled,
    /// An application was removed from an organisation.
    ApplicationUninstalled,
    /// A user was invited into an organisation.
    TrustCreated,
    /// Trust grants, type or inactive flag changed.
    TrustUpdated,
    /// Onboarding completed for a trust.
    TrustAccepted,
    /// A role was created.
    RoleCreated,
    /// A role was updated.
    RoleUpdated,
    /// A role was deleted.
    RoleDeleted,
    /// A permission was created.
    PermissionCreated,
    /// A permission was updated.
    PermissionUpdated,
    /// A permission was deleted.
    PermissionDeleted,
    /// A permission policy was created.
    PolicyCreated,
    /// A permission policy was updated.
    PolicyUpdated,
    /// A permission policy was deleted.
    PolicyDeleted,
    /// An API key was issued.
    ApiKeyCreated,
    /// An API key was updated.
    ApiKeyUpdated,
    /// An API key was revoked.
    ApiKeyDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrganisationCreated => "organisation.created",
            Self::OrganisationRenamed => "organisation.renamed",
            Self::ApplicationInstalled => "organisation.application.installed",
            Self::ApplicationUninstalled => "organisation.application.uninstalled",
            Self::TrustCreated => "trust.created",
            Self::TrustUpdated => "trust.updated",
            Self::TrustAccepted => "trust.accepted",
            Self::RoleCreated => "acl.role.created",
            Self::RoleUpdated => "acl.role.updated",
            Self::RoleDeleted => "acl.role.deleted",
            Self::PermissionCreated => "acl.permission.created",
            Self::PermissionUpdated => "acl.permission.updated",
            Self::PermissionDeleted => "acl.permission.deleted",
            Self::PolicyCreated => "acl.policy.created",
            Self::PolicyUpdated => "acl.policy.updated",
            Self::PolicyDeleted => "acl.policy.deleted",
            Self::ApiKeyCreated => "api_key.created",
            Self::ApiKeyUpdated => "api_key.updated",
            Self::ApiKeyDeleted => "api_key.deleted",
        }
    }
}
