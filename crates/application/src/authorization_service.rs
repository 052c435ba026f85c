//! Effective access resolution and organisation membership checks.

mod switching;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use trustgate_core::{AppError, AppResult, CallerIdentity, OrganisationId, UserId};
use trustgate_domain::{Application, EffectiveAccess, PermissionId, PolicyDecision, Trust};

use crate::{AccessControlRepository, OrganisationRepository, TrustRepository, UserRepository};

pub use switching::SessionProfile;

/// Application service that resolves what a user may do inside an organisation.
#[derive(Clone)]
pub struct AuthorizationService {
    organisation_repository: Arc<dyn OrganisationRepository>,
    user_repository: Arc<dyn UserRepository>,
    trust_repository: Arc<dyn TrustRepository>,
    access_control_repository: Arc<dyn AccessControlRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        organisation_repository: Arc<dyn OrganisationRepository>,
        user_repository: Arc<dyn UserRepository>,
        trust_repository: Arc<dyn TrustRepository>,
        access_control_repository: Arc<dyn AccessControlRepository>,
    ) -> Self {
        Self {
            organisation_repository,
            user_repository,
            trust_repository,
            access_control_repository,
        }
    }

    /// Resolves effective access for a user in an organisation.
    ///
    /// Users without a trust, or with a pending or inactive trust, get an
    /// empty closure.
    pub async fn effective_access(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<EffectiveAccess> {
        match self
            .trust_repository
            .find_trust(user_id, organisation_id)
            .await?
        {
            Some(trust) => self.resolve_trust(&trust).await,
            None => Ok(EffectiveAccess::none()),
        }
    }

    /// Ensures the caller holds an active trust in their current organisation.
    pub async fn require_member(&self, caller: &CallerIdentity) -> AppResult<Trust> {
        self.trust_repository
            .find_trust(caller.user_id(), caller.organisation_id())
            .await?
            .filter(Trust::grants_access)
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "user '{}' is not an active member of organisation '{}'",
                    caller.user_id(),
                    caller.organisation_id()
                ))
            })
    }

    /// Resolves the caller's access, rejecting callers without an active trust.
    pub async fn require_access(&self, caller: &CallerIdentity) -> AppResult<EffectiveAccess> {
        let trust = self.require_member(caller).await?;
        self.resolve_trust(&trust).await
    }

    /// Returns installed applications the caller can reach.
    pub async fn accessible_applications(
        &self,
        caller: &CallerIdentity,
    ) -> AppResult<Vec<Application>> {
        let access = self.require_access(caller).await?;
        let installed = self
            .organisation_repository
            .list_installed_applications(caller.organisation_id())
            .await?;

        Ok(access.filter_installed(installed))
    }

    /// Evaluates permission policies for a resource and verb.
    pub async fn check_access(
        &self,
        caller: &CallerIdentity,
        resource: &str,
        verb: &str,
    ) -> AppResult<PolicyDecision> {
        let access = self.require_access(caller).await?;
        Ok(access.evaluate(resource, verb))
    }

    async fn resolve_trust(&self, trust: &Trust) -> AppResult<EffectiveAccess> {
        if !trust.grants_access() {
            return Ok(EffectiveAccess::none());
        }

        let roles = if trust.role_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_roles(trust.organisation_id, Some(&trust.role_ids))
                .await?
        };

        let mut permission_ids: Vec<PermissionId> = trust.permission_ids.clone();
        permission_ids.extend(roles.iter().flat_map(|role| role.permission_ids.iter().copied()));
        permission_ids.sort();
        permission_ids.dedup();

        let permissions = if permission_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_permissions(trust.organisation_id, Some(&permission_ids))
                .await?
        };

        Ok(EffectiveAccess::resolve(trust, &roles, &permissions))
    }
}
