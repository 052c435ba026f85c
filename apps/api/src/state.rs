use trustgate_application::{
    AccessControlService, ApiKeyService, ApplicationRegistryService, AuthorizationService,
    DirectoryService, OrganisationService, TrustService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub user_service: UserService,
    pub trust_service: TrustService,
    pub directory_service: DirectoryService,
    pub access_control_service: AccessControlService,
    pub api_key_service: ApiKeyService,
    pub organisation_service: OrganisationService,
    pub application_registry_service: ApplicationRegistryService,
    pub frontend_origin: String,
    pub bootstrap_token: String,
}
