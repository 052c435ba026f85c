//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access_control;
mod audit;
mod effective_access;
mod ids;
mod organisation;
mod trust;
mod user;

pub use access_control::{
    ApiKey, Permission, PermissionPolicy, PolicyEffect, Role, normalize_name, normalize_verbs,
};
pub use audit::AuditAction;
pub use effective_access::{EffectiveAccess, PolicyDecision};
pub use ids::{ApiKeyId, ApplicationId, PermissionId, PolicyId, RoleId};
pub use organisation::{Application, DEFAULT_ROLE_NAME, Organisation};
pub use trust::{OnboardingTokenKind, Trust, TrustState};
pub use trustgate_core::{OrganisationId, UserId};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, User, validate_password};
