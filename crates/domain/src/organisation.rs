use serde::{Deserialize, Serialize};
use trustgate_core::OrganisationId;

use crate::ApplicationId;

/// Name of the role seeded into every new organisation.
pub const DEFAULT_ROLE_NAME: &str = "Admin";

/// Tenant root aggregate owning roles, permissions and API keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    /// Stable organisation identifier.
    pub id: OrganisationId,
    /// Mutable display name.
    pub name: String,
}

/// Application registered globally and installable into organisations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Stable application identifier.
    pub id: ApplicationId,
    /// Display name.
    pub name: String,
    /// Base URL of the application backend, if it has one.
    pub backend_url: Option<String>,
    /// Frontend entrypoint bundle.
    pub entrypoint: Option<String>,
    /// Globally unique URL slug.
    pub slug: String,
    /// Public key used by the application to authenticate itself.
    pub public_key: Option<String>,
}
