//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_service;
mod api_key_service;
mod application_registry_service;
mod audit_ports;
mod authorization_service;
mod directory_service;
mod identity_ports;
mod notification_dispatcher;
mod notification_ports;
mod organisation_service;
mod ownership;
mod secret_tokens;
mod trust_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_control_service::AccessControlService;
pub use api_key_service::{ApiKeyPrincipal, ApiKeyService, IssuedApiKey};
pub use application_registry_service::ApplicationRegistryService;
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{AuthorizationService, SessionProfile};
pub use directory_service::DirectoryService;
pub use identity_ports::{
    AccessControlRepository, ApiKeyRepository, ApiKeyUpdate, ApplicationInput,
    ApplicationRepository, MemberQuery, NewApiKey, NewTrust, OrganisationMember,
    OrganisationRepository, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate,
    RoleDraft, RoleUpdate, SeededOrganisation, TrustChanges, TrustRepository, UserCredentials,
    UserRepository,
};
pub use notification_dispatcher::{
    DeliveryOutcome, InviteMessage, InviteNotice, NotificationDispatcher,
};
pub use notification_ports::{EmailService, OnboardingClaims, OnboardingTokenCodec};
pub use organisation_service::{
    BootstrappedOrganisation, OrganisationBootstrap, OrganisationService,
};
pub use trust_service::{InvitedMember, MemberInvite, TrustGrant, TrustService, TrustUpdate};
pub use user_service::{LoginOutcome, OnboardingRedemption, PasswordHasher, UserService};
