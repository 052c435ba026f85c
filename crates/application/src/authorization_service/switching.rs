use tracing::info;
use trustgate_domain::{ApplicationId, Organisation, Permission, PermissionId, Role, RoleId, User};

use super::*;

/// Everything a client needs after choosing an active organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProfile {
    /// Identity to store in the session.
    pub identity: CallerIdentity,
    /// Current user.
    pub user: User,
    /// Active organisation.
    pub organisation: Organisation,
    /// Every organisation the user holds an active trust in.
    pub organisations: Vec<Organisation>,
    /// Effective roles in the active organisation.
    pub roles: Vec<Role>,
    /// Effective permissions in the active organisation.
    pub permissions: Vec<Permission>,
    /// Applications reachable through roles and permission scopes.
    pub application_ids: Vec<ApplicationId>,
}

impl AuthorizationService {
    /// Switches the caller into another organisation.
    ///
    /// The target must be one the user holds an active trust in; otherwise
    /// nothing is persisted and the organisation is reported as not found.
    pub async fn switch_organisation(
        &self,
        caller: &CallerIdentity,
        organisation_id: OrganisationId,
    ) -> AppResult<SessionProfile> {
        let profile = self.build_profile(caller.user_id(), organisation_id).await?;

        self.user_repository
            .set_last_organisation(caller.user_id(), organisation_id)
            .await?;

        info!(
            user_id = %caller.user_id(),
            from = %caller.organisation_id(),
            to = %organisation_id,
            "switched active organisation"
        );

        Ok(profile)
    }

    /// Returns the caller's profile in their current organisation.
    pub async fn current_profile(&self, caller: &CallerIdentity) -> AppResult<SessionProfile> {
        self.build_profile(caller.user_id(), caller.organisation_id())
            .await
    }

    async fn build_profile(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<SessionProfile> {
        let active_trusts: Vec<Trust> = self
            .trust_repository
            .list_trusts_for_user(user_id)
            .await?
            .into_iter()
            .filter(Trust::grants_access)
            .collect();

        let Some(target) = active_trusts
            .iter()
            .find(|trust| trust.organisation_id == organisation_id)
        else {
            return Err(AppError::NotFound(format!(
                "organisation '{organisation_id}' is not among the user's organisations"
            )));
        };

        let user = self
            .user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        if user.inactive {
            return Err(AppError::Forbidden(format!("user '{user_id}' is inactive")));
        }

        let organisation_ids: Vec<OrganisationId> = active_trusts
            .iter()
            .map(|trust| trust.organisation_id)
            .collect();
        let organisations = self
            .organisation_repository
            .list_organisations(&organisation_ids)
            .await?;
        let organisation = organisations
            .iter()
            .find(|organisation| organisation.id == organisation_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("organisation '{organisation_id}' does not exist"))
            })?;

        let access = self.resolve_trust(target).await?;
        let role_ids: Vec<RoleId> = access.role_ids().iter().copied().collect();
        let permission_ids: Vec<PermissionId> = access.permission_ids().iter().copied().collect();

        let roles = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_roles(organisation_id, Some(&role_ids))
                .await?
        };
        let permissions = if permission_ids.is_empty() {
            Vec::new()
        } else {
            self.access_control_repository
                .list_permissions(organisation_id, Some(&permission_ids))
                .await?
        };

        let identity = CallerIdentity::new(
            user.id,
            user.display_name(),
            Some(user.email.clone()),
            organisation_id,
        );

        Ok(SessionProfile {
            identity,
            user,
            organisation,
            organisations,
            roles,
            permissions,
            application_ids: access.application_ids().iter().copied().collect(),
        })
    }
}
