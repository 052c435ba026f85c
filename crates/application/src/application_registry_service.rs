use std::sync::Arc;

use trustgate_core::{AppError, AppResult};
use trustgate_domain::{Application, ApplicationId, normalize_name};

use crate::{ApplicationInput, ApplicationRepository};

/// Operator-level service for the global application registry.
#[derive(Clone)]
pub struct ApplicationRegistryService {
    repository: Arc<dyn ApplicationRepository>,
}

impl ApplicationRegistryService {
    /// Creates a new registry service.
    #[must_use]
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    /// Lists registered applications, optionally restricted to ids.
    pub async fn list_applications(
        &self,
        application_ids: Option<&[ApplicationId]>,
    ) -> AppResult<Vec<Application>> {
        self.repository.list_applications(application_ids).await
    }

    /// Finds an application by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Application> {
        self.repository
            .find_application_by_slug(slug.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("application '{slug}' does not exist")))
    }

    /// Finds an application by public key.
    pub async fn find_by_public_key(&self, public_key: &str) -> AppResult<Application> {
        self.repository
            .find_application_by_public_key(public_key.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("no application uses this public key".to_owned()))
    }

    /// Registers an application.
    pub async fn register_application(&self, input: ApplicationInput) -> AppResult<Application> {
        self.repository
            .create_application(normalize_input(input)?)
            .await
    }

    /// Replaces an application's attributes.
    pub async fn update_application(
        &self,
        application_id: ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        self.repository
            .update_application(application_id, normalize_input(input)?)
            .await
    }

    /// Removes an application from the registry and every organisation.
    pub async fn delete_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Application> {
        self.repository.delete_application(application_id).await
    }
}

fn normalize_input(input: ApplicationInput) -> AppResult<ApplicationInput> {
    let slug = input.slug.trim().to_ascii_lowercase();
    if slug.is_empty()
        || !slug
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '-')
    {
        return Err(AppError::Validation(format!(
            "application slug '{}' must be non-empty lowercase letters, digits or dashes",
            input.slug
        )));
    }

    let optional = |value: Option<String>| {
        value
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };

    Ok(ApplicationInput {
        name: normalize_name(&input.name, "application")?,
        backend_url: optional(input.backend_url),
        entrypoint: optional(input.entrypoint),
        slug,
        public_key: optional(input.public_key),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trustgate_core::AppError;

    use super::ApplicationRegistryService;
    use crate::ApplicationInput;
    use crate::test_support::FakeStore;

    fn input(slug: &str) -> ApplicationInput {
        ApplicationInput {
            name: "Timesheets".to_owned(),
            backend_url: Some(" https://timesheets.internal ".to_owned()),
            entrypoint: Some(String::new()),
            slug: slug.to_owned(),
            public_key: Some("pk_timesheets".to_owned()),
        }
    }

    #[tokio::test]
    async fn registered_application_is_found_by_slug_and_key() {
        let service = ApplicationRegistryService::new(Arc::new(FakeStore::default()));

        let application = service
            .register_application(input(" Timesheets "))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(application.slug, "timesheets");
        assert_eq!(
            application.backend_url.as_deref(),
            Some("https://timesheets.internal")
        );
        assert_eq!(application.entrypoint, None);
        assert_eq!(service.find_by_slug("timesheets").await.ok(), Some(application.clone()));
        assert_eq!(
            service.find_by_public_key("pk_timesheets").await.ok(),
            Some(application)
        );
    }

    #[tokio::test]
    async fn invalid_slug_is_rejected() {
        let service = ApplicationRegistryService::new(Arc::new(FakeStore::default()));

        let result = service.register_application(input("time sheets")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let service = ApplicationRegistryService::new(Arc::new(FakeStore::default()));
        assert!(service.register_application(input("crm")).await.is_ok());

        let result = service.register_application(input("crm")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
