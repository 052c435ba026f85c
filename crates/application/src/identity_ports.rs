mod access_control;
mod api_keys;
mod applications;
mod organisations;
mod trusts;
mod users;

pub use access_control::{
    AccessControlRepository, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate,
    RoleDraft, RoleUpdate,
};
pub use api_keys::{ApiKeyRepository, ApiKeyUpdate, NewApiKey};
pub use applications::{ApplicationInput, ApplicationRepository};
pub use organisations::{OrganisationRepository, SeededOrganisation};
pub use trusts::{NewTrust, TrustChanges, TrustRepository};
pub use users::{MemberQuery, OrganisationMember, UserCredentials, UserRepository};
