use async_trait::async_trait;
use trustgate_core::{AppResult, OrganisationId};
use trustgate_domain::{Application, ApplicationId, Organisation, Role};

/// Organisation created together with its default role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededOrganisation {
    /// Newly created organisation.
    pub organisation: Organisation,
    /// Role seeded into the organisation.
    pub default_role: Role,
}

/// Repository port for organisations and their installed applications.
#[async_trait]
pub trait OrganisationRepository: Send + Sync {
    /// Finds one organisation.
    async fn find_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Organisation>>;

    /// Lists organisations by id. Unknown ids are skipped.
    async fn list_organisations(
        &self,
        organisation_ids: &[OrganisationId],
    ) -> AppResult<Vec<Organisation>>;

    /// Creates an organisation and its default role in one unit of work.
    async fn create_organisation(
        &self,
        name: &str,
        default_role_name: &str,
    ) -> AppResult<SeededOrganisation>;

    /// Renames an organisation.
    async fn rename_organisation(
        &self,
        organisation_id: OrganisationId,
        name: &str,
    ) -> AppResult<Organisation>;

    /// Lists applications installed into an organisation.
    async fn list_installed_applications(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Vec<Application>>;

    /// Installs an application. Installing twice is a no-op.
    async fn install_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()>;

    /// Removes an installed application.
    async fn uninstall_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()>;
}
