use async_graphql::{ComplexObject, Context, Enum, Json, Result as GraphQLResult, SimpleObject};
use serde_json::Value;
use trustgate_application::{IssuedApiKey, OrganisationMember, SessionProfile};
use trustgate_core::CallerIdentity;
use trustgate_domain::{
    ApiKey, Application, ApplicationId, Organisation, OrganisationId, Permission, PermissionId,
    PermissionPolicy, PolicyDecision, Role, RoleId, Trust,
};
use uuid::Uuid;

use crate::state::AppState;

use super::errors::graphql_error;
use super::require_caller;

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Organisation", complex)]
pub struct OrganisationType {
    pub id: Uuid,
    pub name: String,
}

#[ComplexObject]
impl OrganisationType {
    async fn roles(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<RoleType>> {
        let state = ctx.data::<AppState>()?;
        let caller = self.caller(ctx)?;

        let roles = state
            .access_control_service
            .list_roles(&caller, None)
            .await
            .map_err(graphql_error)?;

        Ok(roles.into_iter().map(RoleType::from).collect())
    }

    async fn members(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<UserType>> {
        let state = ctx.data::<AppState>()?;
        let caller = self.caller(ctx)?;

        let members = state
            .directory_service
            .list_people(&caller)
            .await
            .map_err(graphql_error)?;

        Ok(members.into_iter().map(UserType::from).collect())
    }

    #[graphql(name = "apiKeys")]
    async fn api_keys(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<ApiKeyType>> {
        let state = ctx.data::<AppState>()?;
        let caller = self.caller(ctx)?;

        let api_keys = state
            .api_key_service
            .list_api_keys(&caller)
            .await
            .map_err(graphql_error)?;

        Ok(api_keys.into_iter().map(ApiKeyType::from).collect())
    }

    /// Installed applications the caller can reach in this organisation.
    async fn applications(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<ApplicationType>> {
        let state = ctx.data::<AppState>()?;
        let caller = self.caller(ctx)?;

        let applications = state
            .authorization_service
            .accessible_applications(&caller)
            .await
            .map_err(graphql_error)?;

        Ok(applications.into_iter().map(ApplicationType::from).collect())
    }
}

impl OrganisationType {
    /// The session caller, acting in this organisation. Membership is
    /// checked again by every service call.
    fn caller(&self, ctx: &Context<'_>) -> GraphQLResult<CallerIdentity> {
        let caller = require_caller(ctx)?;
        Ok(caller.with_organisation(OrganisationId::from_uuid(self.id)))
    }
}

impl From<Organisation> for OrganisationType {
    fn from(value: Organisation) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Application")]
pub struct ApplicationType {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub backend_url: Option<String>,
    pub entrypoint: Option<String>,
    pub public_key: Option<String>,
}

impl From<Application> for ApplicationType {
    fn from(value: Application) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            slug: value.slug,
            backend_url: value.backend_url,
            entrypoint: value.entrypoint,
            public_key: value.public_key,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "PermissionPolicy")]
pub struct PermissionPolicyType {
    pub id: Uuid,
    pub permission_id: Uuid,
    pub name: String,
    pub resource: String,
    pub verbs: Vec<String>,
    /// `allow` or `deny`.
    pub effect: String,
    pub conditions: Json<Value>,
}

impl From<PermissionPolicy> for PermissionPolicyType {
    fn from(value: PermissionPolicy) -> Self {
        Self {
            id: value.id.as_uuid(),
            permission_id: value.permission_id.as_uuid(),
            name: value.name,
            resource: value.resource,
            verbs: value.verbs,
            effect: value.effect.as_str().to_owned(),
            conditions: Json(value.conditions),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Permission")]
pub struct PermissionType {
    pub id: Uuid,
    pub name: String,
    /// Application the permission is scoped to.
    pub scope_id: Option<Uuid>,
    pub policies: Vec<PermissionPolicyType>,
}

impl From<Permission> for PermissionType {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            scope_id: value.scope.map(|scope| scope.as_uuid()),
            policies: value
                .policies
                .into_iter()
                .map(PermissionPolicyType::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Role", complex)]
pub struct RoleType {
    pub id: Uuid,
    pub name: String,
    pub permission_ids: Vec<Uuid>,
    pub application_ids: Vec<Uuid>,
}

#[ComplexObject]
impl RoleType {
    /// Permissions attached to the role.
    async fn permissions(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PermissionType>> {
        if self.permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let permission_ids: Vec<PermissionId> = self
            .permission_ids
            .iter()
            .copied()
            .map(PermissionId::from_uuid)
            .collect();

        let permissions = state
            .access_control_service
            .list_permissions(caller, Some(&permission_ids))
            .await
            .map_err(graphql_error)?;

        Ok(permissions.into_iter().map(PermissionType::from).collect())
    }

    /// Applications the role opens up.
    async fn applications(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<ApplicationType>> {
        load_applications(ctx, &self.application_ids).await
    }
}

impl From<Role> for RoleType {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            permission_ids: value
                .permission_ids
                .iter()
                .map(|permission_id| permission_id.as_uuid())
                .collect(),
            application_ids: value
                .application_ids
                .iter()
                .map(|application_id| application_id.as_uuid())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Trust")]
pub struct TrustType {
    pub organisation_id: Uuid,
    #[graphql(name = "type")]
    pub trust_type: Option<String>,
    pub accepted: bool,
    pub inactive: bool,
    /// `pending` until onboarding completes, then `active`.
    pub state: String,
    pub role_ids: Vec<Uuid>,
    pub permission_ids: Vec<Uuid>,
    pub issued_by: Option<Uuid>,
}

impl From<Trust> for TrustType {
    fn from(value: Trust) -> Self {
        Self {
            organisation_id: value.organisation_id.as_uuid(),
            state: value.state().as_str().to_owned(),
            trust_type: value.trust_type,
            accepted: value.accepted,
            inactive: value.inactive,
            role_ids: value.role_ids.iter().map(|role_id| role_id.as_uuid()).collect(),
            permission_ids: value
                .permission_ids
                .iter()
                .map(|permission_id| permission_id.as_uuid())
                .collect(),
            issued_by: value.issued_by.map(|issuer| issuer.as_uuid()),
        }
    }
}

/// Organisation member: a user seen through their trust.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "User", complex)]
pub struct UserType {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub inactive: bool,
    pub trust: TrustType,
    #[graphql(skip)]
    pub member: OrganisationMember,
}

#[ComplexObject]
impl UserType {
    /// Roles the member holds in the current organisation.
    async fn roles(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<RoleType>> {
        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;

        let roles = state
            .directory_service
            .member_roles(caller, &self.member)
            .await
            .map_err(graphql_error)?;

        Ok(roles.into_iter().map(RoleType::from).collect())
    }
}

impl From<OrganisationMember> for UserType {
    fn from(value: OrganisationMember) -> Self {
        Self {
            id: value.user.id.as_uuid(),
            name: value.user.name.clone(),
            email: value.user.email.clone(),
            inactive: value.user.inactive,
            trust: TrustType::from(value.trust.clone()),
            member: value,
        }
    }
}

/// Session bundle for the active organisation.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Session", complex)]
pub struct SessionType {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organisation: OrganisationType,
    pub organisations: Vec<OrganisationType>,
    pub roles: Vec<RoleType>,
    pub permissions: Vec<PermissionType>,
    pub application_ids: Vec<Uuid>,
}

#[ComplexObject]
impl SessionType {
    /// Applications reachable through roles and permission scopes.
    async fn applications(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<ApplicationType>> {
        load_applications(ctx, &self.application_ids).await
    }
}

impl From<SessionProfile> for SessionType {
    fn from(value: SessionProfile) -> Self {
        Self {
            id: value.user.id.as_uuid(),
            name: value.user.display_name().to_owned(),
            email: value.user.email,
            organisation: OrganisationType::from(value.organisation),
            organisations: value
                .organisations
                .into_iter()
                .map(OrganisationType::from)
                .collect(),
            roles: value.roles.into_iter().map(RoleType::from).collect(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionType::from)
                .collect(),
            application_ids: value
                .application_ids
                .iter()
                .map(|application_id| application_id.as_uuid())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "APIKey", complex)]
pub struct ApiKeyType {
    pub id: Uuid,
    pub name: String,
    pub role_ids: Vec<Uuid>,
}

#[ComplexObject]
impl ApiKeyType {
    /// Roles granted to the key.
    async fn roles(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<RoleType>> {
        if self.role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let state = ctx.data::<AppState>()?;
        let caller = require_caller(ctx)?;
        let role_ids: Vec<RoleId> = self.role_ids.iter().copied().map(RoleId::from_uuid).collect();

        let roles = state
            .access_control_service
            .list_roles(caller, Some(&role_ids))
            .await
            .map_err(graphql_error)?;

        Ok(roles.into_iter().map(RoleType::from).collect())
    }
}

impl From<ApiKey> for ApiKeyType {
    fn from(value: ApiKey) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            role_ids: value.role_ids.iter().map(|role_id| role_id.as_uuid()).collect(),
        }
    }
}

/// Newly issued key. `key` is never returned again.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CreatedAPIKey")]
pub struct CreatedApiKeyType {
    pub api_key: ApiKeyType,
    pub key: String,
}

impl From<IssuedApiKey> for CreatedApiKeyType {
    fn from(value: IssuedApiKey) -> Self {
        Self {
            api_key: ApiKeyType::from(value.api_key),
            key: value.secret,
        }
    }
}

/// Result of evaluating permission policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum AccessDecision {
    Allow,
    Deny,
    NotApplicable,
}

impl From<PolicyDecision> for AccessDecision {
    fn from(value: PolicyDecision) -> Self {
        match value {
            PolicyDecision::Allow => Self::Allow,
            PolicyDecision::Deny => Self::Deny,
            PolicyDecision::NotApplicable => Self::NotApplicable,
        }
    }
}

async fn load_applications(
    ctx: &Context<'_>,
    application_ids: &[Uuid],
) -> GraphQLResult<Vec<ApplicationType>> {
    if application_ids.is_empty() {
        return Ok(Vec::new());
    }

    let state = ctx.data::<AppState>()?;
    let application_ids: Vec<ApplicationId> = application_ids
        .iter()
        .copied()
        .map(ApplicationId::from_uuid)
        .collect();

    let applications = state
        .application_registry_service
        .list_applications(Some(&application_ids))
        .await
        .map_err(graphql_error)?;

    Ok(applications.into_iter().map(ApplicationType::from).collect())
}
