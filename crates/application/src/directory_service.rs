//! Read-side queries over an organisation's members.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use trustgate_core::{AppError, AppResult, CallerIdentity, UserId};
use trustgate_domain::{Organisation, Role};

use crate::{
    AccessControlRepository, AuthorizationService, MemberQuery, OrganisationMember,
    OrganisationRepository, UserRepository,
};

/// Application service answering directory queries for the caller's organisation.
#[derive(Clone)]
pub struct DirectoryService {
    authorization_service: AuthorizationService,
    organisation_repository: Arc<dyn OrganisationRepository>,
    user_repository: Arc<dyn UserRepository>,
    access_control_repository: Arc<dyn AccessControlRepository>,
}

impl DirectoryService {
    /// Creates a new directory service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        organisation_repository: Arc<dyn OrganisationRepository>,
        user_repository: Arc<dyn UserRepository>,
        access_control_repository: Arc<dyn AccessControlRepository>,
    ) -> Self {
        Self {
            authorization_service,
            organisation_repository,
            user_repository,
            access_control_repository,
        }
    }

    /// Returns the caller's active organisation.
    pub async fn current_organisation(&self, caller: &CallerIdentity) -> AppResult<Organisation> {
        self.authorization_service.require_member(caller).await?;
        self.organisation_repository
            .find_organisation(caller.organisation_id())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "organisation '{}' does not exist",
                    caller.organisation_id()
                ))
            })
    }

    /// Lists members of the caller's organisation.
    ///
    /// With ids, results follow the requested order and unknown ids are
    /// dropped.
    pub async fn list_members(
        &self,
        caller: &CallerIdentity,
        query: MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>> {
        self.authorization_service.require_member(caller).await?;

        let members = self
            .user_repository
            .list_organisation_members(caller.organisation_id(), &query)
            .await?;

        Ok(match &query.user_ids {
            Some(user_ids) => order_by_ids(members, user_ids),
            None => members,
        })
    }

    /// Lists every member of the caller's organisation, active or not.
    pub async fn list_people(&self, caller: &CallerIdentity) -> AppResult<Vec<OrganisationMember>> {
        self.list_members(caller, MemberQuery::default()).await
    }

    /// Returns the roles a member holds in the caller's organisation.
    pub async fn member_roles(
        &self,
        caller: &CallerIdentity,
        member: &OrganisationMember,
    ) -> AppResult<Vec<Role>> {
        if member.trust.organisation_id != caller.organisation_id()
            || member.trust.role_ids.is_empty()
        {
            return Ok(Vec::new());
        }

        self.access_control_repository
            .list_roles(caller.organisation_id(), Some(&member.trust.role_ids))
            .await
    }
}

fn order_by_ids(
    mut members: Vec<OrganisationMember>,
    user_ids: &[UserId],
) -> Vec<OrganisationMember> {
    let mut ordered = Vec::with_capacity(members.len());
    for user_id in user_ids {
        if let Some(index) = members.iter().position(|member| member.user.id == *user_id) {
            ordered.push(members.swap_remove(index));
        }
    }
    ordered
}
