//! Organisation API keys: issuance, rotation of grants and authentication.


use std::sync::Arc;

use tracing::warn;
use trustgate_core::{AppError, AppResult, CallerIdentity};
use trustgate_domain::{
    ApiKey, ApiKeyId, Application, ApplicationId, AuditAction, EffectiveAccess, Organisation,
    Permission, PermissionId, Role, RoleId, normalize_name,
};

use crate::ownership::{dedup_ids, ensure_roles_owned};
use crate::secret_tokens::{digest_secret, generate_secret};
use crate::{
    AccessControlRepository, ApiKeyRepository, ApiKeyUpdate, AuditEvent, AuditRepository,
    AuthorizationService, NewApiKey, OrganisationRepository,
};

const API_KEY_PREFIX: &str = "tg_";

/// Freshly issued key. The secret is never retrievable again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedApiKey {
    /// Stored key.
    pub api_key: ApiKey,
    /// Raw secret to hand to the client.
    pub secret: String,
}

/// Organisation and grants resolved for a presented key.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyPrincipal {
    /// Matched key.
    pub api_key: ApiKey,
    /// Owning organisation.
    pub organisation: Organisation,
    /// Roles the key acts with.
    pub roles: Vec<Role>,
    /// Permissions reachable through those roles.
    pub permissions: Vec<Permission>,
    /// Installed applications reachable through those roles.
    pub applications: Vec<Application>,
}

/// Application service for organisation API keys.
#[derive(Clone)]
pub struct ApiKeyService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ApiKeyRepository>,
    organisation_repository: Arc<dyn OrganisationRepository>,
    access_control_repository: Arc<dyn AccessControlRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ApiKeyService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ApiKeyRepository>,
        organisation_repository: Arc<dyn OrganisationRepository>,
        access_control_repository: Arc<dyn AccessControlRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            organisation_repository,
            access_control_repository,
            audit_repository,
        }
    }

    /// Lists keys of the caller's organisation.
    pub async fn list_api_keys(&self, caller: &CallerIdentity) -> AppResult<Vec<ApiKey>> {
        self.authorization_service.require_member(caller).await?;
        self.repository
            .list_api_keys(caller.organisation_id())
            .await
    }

    /// Issues a key for the caller's organisation.
    pub async fn create_api_key(
        &self,
        caller: &CallerIdentity,
        name: &str,
        role_ids: &[RoleId],
    ) -> AppResult<IssuedApiKey> {
        self.authorization_service.require_member(caller).await?;

        let name = normalize_name(name, "API key")?;
        let role_ids = dedup_ids(role_ids);
        ensure_roles_owned(
            self.access_control_repository.as_ref(),
            caller.organisation_id(),
            &role_ids,
        )
        .await?;

        let (secret, key_digest) = generate_secret(API_KEY_PREFIX)?;
        let api_key = self
            .repository
            .create_api_key(
                caller.organisation_id(),
                NewApiKey {
                    name,
                    key_digest,
                    role_ids,
                },
            )
            .await?;

        self.append_audit(caller, AuditAction::ApiKeyCreated, &api_key, "issued")
            .await?;

        Ok(IssuedApiKey { api_key, secret })
    }

    /// Updates name or roles of a key of the caller's organisation.
    pub async fn update_api_key(
        &self,
        caller: &CallerIdentity,
        api_key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> AppResult<ApiKey> {
        self.authorization_service.require_member(caller).await?;

        let update = ApiKeyUpdate {
            name: update
                .name
                .as_deref()
                .map(|name| normalize_name(name, "API key"))
                .transpose()?,
            role_ids: update.role_ids.as_deref().map(dedup_ids),
        };
        if let Some(role_ids) = &update.role_ids {
            ensure_roles_owned(
                self.access_control_repository.as_ref(),
                caller.organisation_id(),
                role_ids,
            )
            .await?;
        }

        let api_key = self
            .repository
            .update_api_key(caller.organisation_id(), api_key_id, update)
            .await?;

        self.append_audit(caller, AuditAction::ApiKeyUpdated, &api_key, "updated")
            .await?;

        Ok(api_key)
    }

    /// Revokes a key of the caller's organisation.
    pub async fn delete_api_key(
        &self,
        caller: &CallerIdentity,
        api_key_id: ApiKeyId,
    ) -> AppResult<ApiKey> {
        self.authorization_service.require_member(caller).await?;

        let api_key = self
            .repository
            .delete_api_key(caller.organisation_id(), api_key_id)
            .await?;

        self.append_audit(caller, AuditAction::ApiKeyDeleted, &api_key, "revoked")
            .await?;

        Ok(api_key)
    }

    /// Resolves a presented secret to its organisation and grants.
    pub async fn authenticate_api_key(&self, secret: &str) -> AppResult<ApiKeyPrincipal> {
        let secret = secret.trim();
        let api_key = match self
            .repository
            .find_api_key_by_digest(&digest_secret(secret))
            .await?
        {
            Some(api_key) => api_key,
            None => {
                warn!("rejected unknown API key");
                return Err(AppError::Unauthorized("invalid API key".to_owned()));
            }
        };

        let organisation = self
            .organisation_repository
            .find_organisation(api_key.organisation_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid API key".to_owned()))?;

        let roles = if api_key.role_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_roles(organisation.id, Some(&api_key.role_ids))
                .await?
        };
        let permission_ids: Vec<PermissionId> = dedup_ids(
            &roles
                .iter()
                .flat_map(|role| role.permission_ids.iter().copied())
                .collect::<Vec<_>>(),
        );
        let permissions = if permission_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_permissions(organisation.id, Some(&permission_ids))
                .await?
        };

        let access = EffectiveAccess::for_api_key(&api_key, &roles, &permissions);
        let application_ids: Vec<ApplicationId> =
            access.application_ids().iter().copied().collect();
        let applications = if application_ids.is_empty() {
            Vec::new()
        } else {
            let installed = self
                .organisation_repository
                .list_installed_applications(organisation.id)
                .await?;
            access.filter_installed(installed)
        };

        Ok(ApiKeyPrincipal {
            api_key,
            organisation,
            roles,
            permissions,
            applications,
        })
    }

    async fn append_audit(
        &self,
        caller: &CallerIdentity,
        action: AuditAction,
        api_key: &ApiKey,
        verb: &str,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organisation_id: caller.organisation_id(),
                subject: caller.user_id().to_string(),
                action,
                resource_type: "api_key".to_owned(),
                resource_id: api_key.id.to_string(),
                detail: Some(format!("{verb} API key '{}'", api_key.name)),
            })
            .await
    }
}
