use async_trait::async_trait;
use trustgate_core::AppResult;
use trustgate_domain::{Application, ApplicationId};

/// Input payload for registering or replacing an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
    /// Display name.
    pub name: String,
    /// Backend base URL.
    pub backend_url: Option<String>,
    /// Frontend entrypoint.
    pub entrypoint: Option<String>,
    /// Globally unique slug.
    pub slug: String,
    /// Public key used to identify the application.
    pub public_key: Option<String>,
}

/// Repository port for the global application registry.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Lists registered applications, optionally restricted to ids.
    async fn list_applications(
        &self,
        application_ids: Option<&[ApplicationId]>,
    ) -> AppResult<Vec<Application>>;

    /// Finds an application by slug.
    async fn find_application_by_slug(&self, slug: &str) -> AppResult<Option<Application>>;

    /// Finds an application by public key.
    async fn find_application_by_public_key(
        &self,
        public_key: &str,
    ) -> AppResult<Option<Application>>;

    /// Registers an application. Duplicate slugs conflict.
    async fn create_application(&self, input: ApplicationInput) -> AppResult<Application>;

    /// Replaces an application's attributes.
    async fn update_application(
        &self,
        application_id: ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application>;

    /// Removes an application and every installation of it.
    async fn delete_application(&self, application_id: ApplicationId) -> AppResult<Application>;
}
