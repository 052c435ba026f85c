use async_graphql::{Context, Object, Result as GraphQLResult};
use trustgate_application::MemberQuery;
use trustgate_core::UserId;
use trustgate_domain::{ApplicationId, PermissionId, RoleId};
use uuid::Uuid;

use crate::state::AppState;

use super::errors::graphql_error;
use super::require_caller;
use super::types::{
    AccessDecision, ApiKeyType, ApplicationType, OrganisationType, PermissionType, RoleType,
    SessionType, UserType,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The caller's active organisation.
    async fn organisation(&self, ctx: &Context<'_>) -> GraphQLResult<OrganisationType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let organisation = state
            .directory_service
            .current_organisation(caller)
            .await
            .map_err(graphql_error)?;

        Ok(OrganisationType::from(organisation))
    }

    /// Members of the active organisation, optionally restricted to ids and
    /// to active accounts with active trusts.
    async fn users(
        &self,
        ctx: &Context<'_>,
        ids: Option<Vec<Uuid>>,
        active: Option<bool>,
    ) -> GraphQLResult<Vec<UserType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let members = state
            .directory_service
            .list_members(
                caller,
                MemberQuery {
                    user_ids: ids.map(|ids| ids.into_iter().map(UserId::from_uuid).collect()),
                    active_only: active.unwrap_or(false),
                },
            )
            .await
            .map_err(graphql_error)?;

        Ok(members.into_iter().map(UserType::from).collect())
    }

    /// Every member of the active organisation.
    async fn people(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<UserType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let members = state
            .directory_service
            .list_people(caller)
            .await
            .map_err(graphql_error)?;

        Ok(members.into_iter().map(UserType::from).collect())
    }

    async fn permissions(
        &self,
        ctx: &Context<'_>,
        ids: Option<Vec<Uuid>>,
    ) -> GraphQLResult<Vec<PermissionType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let ids: Option<Vec<PermissionId>> =
            ids.map(|ids| ids.into_iter().map(PermissionId::from_uuid).collect());

        let permissions = state
            .access_control_service
            .list_permissions(caller, ids.as_deref())
            .await
            .map_err(graphql_error)?;

        Ok(permissions.into_iter().map(PermissionType::from).collect())
    }

    async fn roles(
        &self,
        ctx: &Context<'_>,
        ids: Option<Vec<Uuid>>,
    ) -> GraphQLResult<Vec<RoleType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let ids: Option<Vec<RoleId>> =
            ids.map(|ids| ids.into_iter().map(RoleId::from_uuid).collect());

        let roles = state
            .access_control_service
            .list_roles(caller, ids.as_deref())
            .await
            .map_err(graphql_error)?;

        Ok(roles.into_iter().map(RoleType::from).collect())
    }

    /// The caller's session bundle in the active organisation.
    async fn me(&self, ctx: &Context<'_>) -> GraphQLResult<SessionType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let profile = state
            .authorization_service
            .current_profile(caller)
            .await
            .map_err(graphql_error)?;

        Ok(SessionType::from(profile))
    }

    /// Registered applications, optionally restricted to ids.
    async fn applications(
        &self,
        ctx: &Context<'_>,
        ids: Option<Vec<Uuid>>,
    ) -> GraphQLResult<Vec<ApplicationType>> {
        let state = ctx.data::<AppState>()?;
        require_caller(ctx)?;
        let ids: Option<Vec<ApplicationId>> =
            ids.map(|ids| ids.into_iter().map(ApplicationId::from_uuid).collect());

        let applications = state
            .application_registry_service
            .list_applications(ids.as_deref())
            .await
            .map_err(graphql_error)?;

        Ok(applications.into_iter().map(ApplicationType::from).collect())
    }

    /// Installed applications the caller can reach.
    async fn accessible_applications(
        &self,
        ctx: &Context<'_>,
    ) -> GraphQLResult<Vec<ApplicationType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let applications = state
            .authorization_service
            .accessible_applications(caller)
            .await
            .map_err(graphql_error)?;

        Ok(applications.into_iter().map(ApplicationType::from).collect())
    }

    #[graphql(name = "apiKeys")]
    async fn api_keys(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<ApiKeyType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let api_keys = state
            .api_key_service
            .list_api_keys(caller)
            .await
            .map_err(graphql_error)?;

        Ok(api_keys.into_iter().map(ApiKeyType::from).collect())
    }

    /// Evaluates the caller's permission policies for a resource and verb.
    async fn check_access(
        &self,
        ctx: &Context<'_>,
        resource: String,
        verb: String,
    ) -> GraphQLResult<AccessDecision> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let decision = state
            .authorization_service
            .check_access(caller, &resource, &verb)
            .await
            .map_err(graphql_error)?;

        Ok(AccessDecision::from(decision))
    }
}
