//! Organisation bootstrap and settings.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::info;
use trustgate_core::{AppError, AppResult, CallerIdentity};
use trustgate_domain::{
    Application, ApplicationId, AuditAction, DEFAULT_ROLE_NAME, EmailAddress, Organisation, Role,
    User, normalize_name, validate_password,
};

use crate::{
    ApplicationRepository, AuditEvent, AuditRepository, AuthorizationService, NewTrust,
    OrganisationRepository, PasswordHasher, TrustRepository, UserRepository,
};

/// Request to create an organisation with its first administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationBootstrap {
    /// Organisation name.
    pub name: String,
    /// Email of the owning user. Existing accounts are reused.
    pub owner_email: String,
    /// Name for a newly created owner.
    pub owner_name: Option<String>,
    /// Password to set on the owner account.
    pub owner_password: Option<String>,
}

/// Result of bootstrapping an organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrappedOrganisation {
    /// New organisation.
    pub organisation: Organisation,
    /// Seeded administrator role.
    pub admin_role: Role,
    /// Owner holding the administrator role.
    pub owner: User,
}

/// Application service for organisation lifecycle and installed applications.
#[derive(Clone)]
pub struct OrganisationService {
    authorization_service: AuthorizationService,
    organisation_repository: Arc<dyn OrganisationRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
    user_repository: Arc<dyn UserRepository>,
    trust_repository: Arc<dyn TrustRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl OrganisationService {
    /// Creates a new organisation service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        organisation_repository: Arc<dyn OrganisationRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
        user_repository: Arc<dyn UserRepository>,
        trust_repository: Arc<dyn TrustRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            authorization_service,
            organisation_repository,
            application_repository,
            user_repository,
            trust_repository,
            audit_repository,
            password_hasher,
        }
    }

    /// Creates an organisation, seeds its administrator role and grants it
    /// to the owner through an accepted trust.
    pub async fn bootstrap_organisation(
        &self,
        request: OrganisationBootstrap,
    ) -> AppResult<BootstrappedOrganisation> {
        let name = normalize_name(&request.name, "organisation")?;
        let owner_email = EmailAddress::new(&request.owner_email)?;
        let password_hash = match request.owner_password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.password_hasher.hash_password(password)?)
            }
            None => None,
        };

        let owner = match self.user_repository.find_user_by_email(&owner_email).await? {
            Some(user) => user,
            None => {
                self.user_repository
                    .create_user(&owner_email, request.owner_name.as_deref())
                    .await?
            }
        };
        if let Some(password_hash) = &password_hash {
            self.user_repository
                .set_password_hash(owner.id, password_hash)
                .await?;
        }

        let seeded = self
            .organisation_repository
            .create_organisation(&name, DEFAULT_ROLE_NAME)
            .await?;
        let organisation = seeded.organisation;

        self.trust_repository
            .create_trust(NewTrust {
                user_id: owner.id,
                organisation_id: organisation.id,
                trust_type: Some("owner".to_owned()),
                issued_by: owner.id,
                role_ids: vec![seeded.default_role.id],
                permission_ids: Vec::new(),
            })
            .await?;
        self.trust_repository
            .accept_trust(owner.id, organisation.id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organisation_id: organisation.id,
                subject: owner.id.to_string(),
                action: AuditAction::OrganisationCreated,
                resource_type: "organisation".to_owned(),
                resource_id: organisation.id.to_string(),
                detail: Some(format!(
                    "created organisation '{}' owned by '{}'",
                    organisation.name, owner.email
                )),
            })
            .await?;

        info!(
            organisation_id = %organisation.id,
            owner_id = %owner.id,
            "organisation bootstrapped"
        );

        Ok(BootstrappedOrganisation {
            organisation,
            admin_role: seeded.default_role,
            owner,
        })
    }

    /// Renames the caller's organisation.
    pub async fn rename_organisation(
        &self,
        caller: &CallerIdentity,
        name: &str,
    ) -> AppResult<Organisation> {
        self.authorization_service.require_member(caller).await?;
        let name = normalize_name(name, "organisation")?;

        let organisation = self
            .organisation_repository
            .rename_organisation(caller.organisation_id(), &name)
            .await?;

        self.append_audit(
            caller,
            AuditAction::OrganisationRenamed,
            "organisation",
            organisation.id.to_string(),
            format!("renamed organisation to '{}'", organisation.name),
        )
        .await?;

        Ok(organisation)
    }

    /// Installs a registered application into the caller's organisation.
    pub async fn install_application(
        &self,
        caller: &CallerIdentity,
        application_id: ApplicationId,
    ) -> AppResult<Application> {
        self.authorization_service.require_member(caller).await?;
        let application = self.registered_application(application_id).await?;

        self.organisation_repository
            .install_application(caller.organisation_id(), application_id)
            .await?;

        self.append_audit(
            caller,
            AuditAction::ApplicationInstalled,
            "application",
            application.id.to_string(),
            format!("installed application '{}'", application.slug),
        )
        .await?;

        Ok(application)
    }

    /// Removes an application from the caller's organisation.
    pub async fn uninstall_application(
        &self,
        caller: &CallerIdentity,
        application_id: ApplicationId,
    ) -> AppResult<Application> {
        self.authorization_service.require_member(caller).await?;
        let application = self.registered_application(application_id).await?;

        self.organisation_repository
            .uninstall_application(caller.organisation_id(), application_id)
            .await?;

        self.append_audit(
            caller,
            AuditAction::ApplicationUninstalled,
            "application",
            application.id.to_string(),
            format!("uninstalled application '{}'", application.slug),
        )
        .await?;

        Ok(application)
    }

    async fn registered_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Application> {
        self.application_repository
            .list_applications(Some(std::slice::from_ref(&application_id)))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound(format!("application '{application_id}' does not exist"))
            })
    }

    async fn append_audit(
        &self,
        caller: &CallerIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organisation_id: caller.organisation_id(),
                subject: caller.user_id().to_string(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
