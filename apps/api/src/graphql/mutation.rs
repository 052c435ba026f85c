use async_graphql::{Context, Object, Result as GraphQLResult};
use tower_sessions::Session;
use trustgate_core::{OrganisationId, UserId};
use trustgate_domain::{ApiKeyId, ApplicationId, PermissionId, PolicyId, RoleId};
use uuid::Uuid;

use crate::auth::replace_identity;
use crate::state::AppState;

use super::errors::graphql_error;
use super::inputs::{ApiKeyInput, PermissionInput, PermissionPolicyInput, RoleInput, UserTrustInput};
use super::require_caller;
use super::types::{
    ApiKeyType, ApplicationType, CreatedApiKeyType, OrganisationType, PermissionPolicyType,
    PermissionType, RoleType, SessionType, UserType,
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Moves the session to another organisation the caller is trusted by.
    async fn switch_organisation(&self, ctx: &Context<'_>, id: Uuid) -> GraphQLResult<SessionType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let profile = state
            .authorization_service
            .switch_organisation(caller, OrganisationId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        if let Some(session) = ctx.data_opt::<Session>() {
            replace_identity(session, &profile)
                .await
                .map_err(graphql_error)?;
        }

        Ok(SessionType::from(profile))
    }

    /// Invites a user into the caller's organisation.
    async fn create_user_trust(
        &self,
        ctx: &Context<'_>,
        input: UserTrustInput,
    ) -> GraphQLResult<UserType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let invited = state
            .trust_service
            .invite_member(caller, input.into_invite())
            .await
            .map_err(graphql_error)?;

        Ok(UserType::from(invited.member))
    }

    async fn update_user_trust(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UserTrustInput,
    ) -> GraphQLResult<UserType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let member = state
            .trust_service
            .update_trust(caller, UserId::from_uuid(id), input.into_update())
            .await
            .map_err(graphql_error)?;

        Ok(UserType::from(member))
    }

    async fn create_role(&self, ctx: &Context<'_>, input: RoleInput) -> GraphQLResult<RoleType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let draft = input.into_draft().map_err(graphql_error)?;

        let role = state
            .access_control_service
            .create_role(caller, draft)
            .await
            .map_err(graphql_error)?;

        Ok(RoleType::from(role))
    }

    async fn update_role(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: RoleInput,
    ) -> GraphQLResult<RoleType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let role = state
            .access_control_service
            .update_role(caller, RoleId::from_uuid(id), input.into_update())
            .await
            .map_err(graphql_error)?;

        Ok(RoleType::from(role))
    }

    async fn delete_role(&self, ctx: &Context<'_>, id: Uuid) -> GraphQLResult<RoleType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let role = state
            .access_control_service
            .delete_role(caller, RoleId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        Ok(RoleType::from(role))
    }

    async fn create_permission(
        &self,
        ctx: &Context<'_>,
        input: PermissionInput,
    ) -> GraphQLResult<PermissionType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let draft = input.into_draft().map_err(graphql_error)?;

        let permission = state
            .access_control_service
            .create_permission(caller, draft)
            .await
            .map_err(graphql_error)?;

        Ok(PermissionType::from(permission))
    }

    async fn update_permission(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: PermissionInput,
    ) -> GraphQLResult<PermissionType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let permission = state
            .access_control_service
            .update_permission(caller, PermissionId::from_uuid(id), input.into_update())
            .await
            .map_err(graphql_error)?;

        Ok(PermissionType::from(permission))
    }

    async fn delete_permission(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> GraphQLResult<PermissionType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let permission = state
            .access_control_service
            .delete_permission(caller, PermissionId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        Ok(PermissionType::from(permission))
    }

    async fn create_permission_policy(
        &self,
        ctx: &Context<'_>,
        permission_id: Uuid,
        input: PermissionPolicyInput,
    ) -> GraphQLResult<PermissionPolicyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let draft = input.into_draft().map_err(graphql_error)?;

        let policy = state
            .access_control_service
            .create_policy(caller, PermissionId::from_uuid(permission_id), draft)
            .await
            .map_err(graphql_error)?;

        Ok(PermissionPolicyType::from(policy))
    }

    async fn update_permission_policy(
        &self,
        ctx: &Context<'_>,
        permission_id: Uuid,
        id: Uuid,
        input: PermissionPolicyInput,
    ) -> GraphQLResult<PermissionPolicyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let update = input.into_update().map_err(graphql_error)?;

        let policy = state
            .access_control_service
            .update_policy(
                caller,
                PermissionId::from_uuid(permission_id),
                PolicyId::from_uuid(id),
                update,
            )
            .await
            .map_err(graphql_error)?;

        Ok(PermissionPolicyType::from(policy))
    }

    async fn delete_permission_policy(
        &self,
        ctx: &Context<'_>,
        permission_id: Uuid,
        id: Uuid,
    ) -> GraphQLResult<PermissionPolicyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let policy = state
            .access_control_service
            .delete_policy(
                caller,
                PermissionId::from_uuid(permission_id),
                PolicyId::from_uuid(id),
            )
            .await
            .map_err(graphql_error)?;

        Ok(PermissionPolicyType::from(policy))
    }

    /// Issues a key. The secret is only returned here.
    #[graphql(name = "createAPIKey")]
    async fn create_api_key(
        &self,
        ctx: &Context<'_>,
        input: ApiKeyInput,
    ) -> GraphQLResult<CreatedApiKeyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let (name, role_ids) = input.into_parts().map_err(graphql_error)?;

        let issued = state
            .api_key_service
            .create_api_key(caller, &name, &role_ids)
            .await
            .map_err(graphql_error)?;

        Ok(CreatedApiKeyType::from(issued))
    }

    #[graphql(name = "updateAPIKey")]
    async fn update_api_key(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: ApiKeyInput,
    ) -> GraphQLResult<ApiKeyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let api_key = state
            .api_key_service
            .update_api_key(caller, ApiKeyId::from_uuid(id), input.into_update())
            .await
            .map_err(graphql_error)?;

        Ok(ApiKeyType::from(api_key))
    }

    #[graphql(name = "deleteAPIKey")]
    async fn delete_api_key(&self, ctx: &Context<'_>, id: Uuid) -> GraphQLResult<ApiKeyType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let api_key = state
            .api_key_service
            .delete_api_key(caller, ApiKeyId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        Ok(ApiKeyType::from(api_key))
    }

    async fn rename_organisation(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> GraphQLResult<OrganisationType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let organisation = state
            .organisation_service
            .rename_organisation(caller, &name)
            .await
            .map_err(graphql_error)?;

        Ok(OrganisationType::from(organisation))
    }

    async fn install_application(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> GraphQLResult<ApplicationType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let application = state
            .organisation_service
            .install_application(caller, ApplicationId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        Ok(ApplicationType::from(application))
    }

    async fn uninstall_application(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> GraphQLResult<ApplicationType> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let application = state
            .organisation_service
            .uninstall_application(caller, ApplicationId::from_uuid(id))
            .await
            .map_err(graphql_error)?;

        Ok(ApplicationType::from(application))
    }
}
