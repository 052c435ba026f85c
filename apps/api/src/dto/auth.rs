use serde::{Deserialize, Serialize};
use trustgate_application::{ApiKeyPrincipal, SessionProfile};
use ts_rs::TS;

use super::admin::ApplicationResponse;
use super::common::{NamedResourceResponse, OrganisationResponse, PermissionResponse};

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// Incoming payload for redeeming an invitation link.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-onboarding-request.ts"
)]
pub struct AuthOnboardingRequest {
    pub token: String,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Signed-in user and their standing in the active organisation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub organisation: OrganisationResponse,
    pub organisations: Vec<OrganisationResponse>,
    pub roles: Vec<NamedResourceResponse>,
    pub permissions: Vec<PermissionResponse>,
    pub application_ids: Vec<String>,
}

impl From<SessionProfile> for SessionResponse {
    fn from(value: SessionProfile) -> Self {
        Self {
            user_id: value.user.id.to_string(),
            display_name: value.user.display_name().to_owned(),
            email: value.user.email.clone(),
            organisation: OrganisationResponse::from(&value.organisation),
            organisations: value
                .organisations
                .iter()
                .map(OrganisationResponse::from)
                .collect(),
            roles: value.roles.iter().map(NamedResourceResponse::from).collect(),
            permissions: value
                .permissions
                .iter()
                .map(PermissionResponse::from)
                .collect(),
            application_ids: value
                .application_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Incoming payload for verifying an API key on behalf of a client.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/api-key-verify-request.ts"
)]
pub struct ApiKeyVerifyRequest {
    pub key: String,
}

/// Organisation and grants behind an API key.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/api-key-principal-response.ts"
)]
pub struct ApiKeyPrincipalResponse {
    pub api_key: NamedResourceResponse,
    pub organisation: OrganisationResponse,
    pub roles: Vec<NamedResourceResponse>,
    pub permissions: Vec<PermissionResponse>,
    pub applications: Vec<ApplicationResponse>,
}

impl From<ApiKeyPrincipal> for ApiKeyPrincipalResponse {
    fn from(value: ApiKeyPrincipal) -> Self {
        Self {
            api_key: NamedResourceResponse {
                id: value.api_key.id.to_string(),
                name: value.api_key.name,
            },
            organisation: OrganisationResponse::from(&value.organisation),
            roles: value.roles.iter().map(NamedResourceResponse::from).collect(),
            permissions: value
                .permissions
                .iter()
                .map(PermissionResponse::from)
                .collect(),
            applications: value
                .applications
                .into_iter()
                .map(ApplicationResponse::from)
                .collect(),
        }
    }
}
