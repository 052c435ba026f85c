use serde::{Deserialize, Serialize};
use trustgate_application::{ApplicationInput, BootstrappedOrganisation, OrganisationBootstrap};
use trustgate_domain::Application;
use ts_rs::TS;

use super::common::OrganisationResponse;

/// Incoming payload for creating an organisation with its owner.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-organisation-request.ts"
)]
pub struct BootstrapOrganisationRequest {
    pub name: String,
    pub owner_email: String,
    pub owner_name: Option<String>,
    pub owner_password: Option<String>,
}

impl From<BootstrapOrganisationRequest> for OrganisationBootstrap {
    fn from(value: BootstrapOrganisationRequest) -> Self {
        Self {
            name: value.name,
            owner_email: value.owner_email,
            owner_name: value.owner_name,
            owner_password: value.owner_password,
        }
    }
}

/// Created organisation, its administrator role and owner.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-organisation-response.ts"
)]
pub struct BootstrapOrganisationResponse {
    pub organisation: OrganisationResponse,
    pub admin_role_id: String,
    pub owner_id: String,
}

impl From<BootstrappedOrganisation> for BootstrapOrganisationResponse {
    fn from(value: BootstrappedOrganisation) -> Self {
        Self {
            organisation: OrganisationResponse::from(&value.organisation),
            admin_role_id: value.admin_role.id.to_string(),
            owner_id: value.owner.id.to_string(),
        }
    }
}

/// Incoming payload for registering or updating an application.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/application-request.ts"
)]
pub struct ApplicationRequest {
    pub name: String,
    pub slug: String,
    pub backend_url: Option<String>,
    pub entrypoint: Option<String>,
    pub public_key: Option<String>,
}

impl From<ApplicationRequest> for ApplicationInput {
    fn from(value: ApplicationRequest) -> Self {
        Self {
            name: value.name,
            backend_url: value.backend_url,
            entrypoint: value.entrypoint,
            slug: value.slug,
            public_key: value.public_key,
        }
    }
}

/// Registered application.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/application-response.ts"
)]
pub struct ApplicationResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub backend_url: Option<String>,
    pub entrypoint: Option<String>,
    pub public_key: Option<String>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            slug: value.slug,
            backend_url: value.backend_url,
            entrypoint: value.entrypoint,
            public_key: value.public_key,
        }
    }
}
