use std::sync::Arc;

use sqlx::PgPool;
use trustgate_application::{
    AccessControlRepository, AccessControlService, ApiKeyRepository, ApiKeyService,
    ApplicationRegistryService, ApplicationRepository, AuditRepository, AuthorizationService,
    DirectoryService, EmailService, NotificationDispatcher, OnboardingTokenCodec,
    OrganisationRepository, OrganisationService, PasswordHasher, TrustRepository, TrustService,
    UserRepository, UserService,
};
use trustgate_core::AppError;
use trustgate_infrastructure::{
    Argon2PasswordHasher, JwtOnboardingTokenCodec, PostgresAccessControlRepository,
    PostgresApiKeyRepository, PostgresApplicationRepository, PostgresAuditRepository,
    PostgresOrganisationRepository, PostgresTrustRepository, PostgresUserRepository,
};
use url::Url;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::email::build_email_service;

/// Identity store ports shared by every service.
#[derive(Clone)]
pub struct RepositorySet {
    pub organisation_repository: Arc<dyn OrganisationRepository>,
    pub application_repository: Arc<dyn ApplicationRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub trust_repository: Arc<dyn TrustRepository>,
    pub access_control_repository: Arc<dyn AccessControlRepository>,
    pub api_key_repository: Arc<dyn ApiKeyRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            organisation_repository: Arc::new(PostgresOrganisationRepository::new(pool.clone())),
            application_repository: Arc::new(PostgresApplicationRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            trust_repository: Arc::new(PostgresTrustRepository::new(pool.clone())),
            access_control_repository: Arc::new(PostgresAccessControlRepository::new(
                pool.clone(),
            )),
            api_key_repository: Arc::new(PostgresApiKeyRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    /// Backs every port with one shared store.
    #[cfg(test)]
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: OrganisationRepository
            + ApplicationRepository
            + UserRepository
            + TrustRepository
            + AccessControlRepository
            + ApiKeyRepository
            + AuditRepository
            + 'static,
    {
        Self {
            organisation_repository: store.clone(),
            application_repository: store.clone(),
            user_repository: store.clone(),
            trust_repository: store.clone(),
            access_control_repository: store.clone(),
            api_key_repository: store.clone(),
            audit_repository: store,
        }
    }
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let token_codec: Arc<dyn OnboardingTokenCodec> = Arc::new(JwtOnboardingTokenCodec::new(
        &config.onboarding_token_secret,
    )?);

    Ok(build_services(
        RepositorySet::postgres(&pool),
        Arc::new(Argon2PasswordHasher::new()),
        token_codec,
        build_email_service(config)?,
        &config.frontend_url,
        config.cors_origin(),
        config.bootstrap_token.clone(),
    ))
}

pub fn build_services(
    repositories: RepositorySet,
    password_hasher: Arc<dyn PasswordHasher>,
    token_codec: Arc<dyn OnboardingTokenCodec>,
    email_service: Option<Arc<dyn EmailService>>,
    frontend_url: &Url,
    frontend_origin: String,
    bootstrap_token: String,
) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.organisation_repository.clone(),
        repositories.user_repository.clone(),
        repositories.trust_repository.clone(),
        repositories.access_control_repository.clone(),
    );
    let notification_dispatcher =
        NotificationDispatcher::new(email_service, token_codec.clone(), frontend_url.clone());
    let trust_service = TrustService::new(
        authorization_service.clone(),
        repositories.organisation_repository.clone(),
        repositories.user_repository.clone(),
        repositories.trust_repository.clone(),
        repositories.access_control_repository.clone(),
        repositories.audit_repository.clone(),
        notification_dispatcher,
    );

    AppState {
        user_service: UserService::new(
            repositories.user_repository.clone(),
            repositories.trust_repository.clone(),
            password_hasher.clone(),
            token_codec,
            trust_service.clone(),
        ),
        directory_service: DirectoryService::new(
            authorization_service.clone(),
            repositories.organisation_repository.clone(),
            repositories.user_repository.clone(),
            repositories.access_control_repository.clone(),
        ),
        access_control_service: AccessControlService::new(
            authorization_service.clone(),
            repositories.access_control_repository.clone(),
            repositories.application_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        api_key_service: ApiKeyService::new(
            authorization_service.clone(),
            repositories.api_key_repository,
            repositories.organisation_repository.clone(),
            repositories.access_control_repository,
            repositories.audit_repository.clone(),
        ),
        organisation_service: OrganisationService::new(
            authorization_service.clone(),
            repositories.organisation_repository,
            repositories.application_repository.clone(),
            repositories.user_repository,
            repositories.trust_repository,
            repositories.audit_repository,
            password_hasher,
        ),
        application_registry_service: ApplicationRegistryService::new(
            repositories.application_repository,
        ),
        trust_service,
        authorization_service,
        frontend_origin,
        bootstrap_token,
    }
}
