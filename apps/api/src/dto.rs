mod admin;
mod auth;
mod common;

pub use admin::{
    ApplicationRequest, ApplicationResponse, BootstrapOrganisationRequest,
    BootstrapOrganisationResponse,
};
pub use auth::{
    ApiKeyPrincipalResponse, ApiKeyVerifyRequest, AuthLoginRequest, AuthOnboardingRequest,
    SessionResponse,
};
pub use common::{HealthResponse, NamedResourceResponse, OrganisationResponse, PermissionResponse};
