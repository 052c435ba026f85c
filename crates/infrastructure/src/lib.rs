//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod in_memory_identity_store;
mod jwt_onboarding_token_codec;
mod postgres_access_control_repository;
mod postgres_api_key_repository;
mod postgres_application_repository;
mod postgres_audit_repository;
mod postgres_organisation_repository;
mod postgres_trust_repository;
mod postgres_user_repository;
mod smtp_email_service;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use in_memory_identity_store::InMemoryIdentityStore;
pub use jwt_onboarding_token_codec::{
    JwtOnboardingTokenCodec, MIN_SECRET_LENGTH, ONBOARDING_TOKEN_TTL_DAYS,
};
pub use postgres_access_control_repository::PostgresAccessControlRepository;
pub use postgres_api_key_repository::PostgresApiKeyRepository;
pub use postgres_application_repository::PostgresApplicationRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_organisation_repository::PostgresOrganisationRepository;
pub use postgres_trust_repository::PostgresTrustRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
