use async_trait::async_trait;
use serde_json::Value;
use trustgate_core::{AppResult, OrganisationId};
use trustgate_domain::{
    ApplicationId, Permission, PermissionId, PermissionPolicy, PolicyEffect, PolicyId, Role,
    RoleId,
};

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    /// Role name.
    pub name: String,
    /// Permissions attached to the role.
    pub permission_ids: Vec<PermissionId>,
    /// Applications opened by the role.
    pub application_ids: Vec<ApplicationId>,
}

/// Partial role update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement permission set.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// Replacement application set.
    pub application_ids: Option<Vec<ApplicationId>>,
}

/// Input payload for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDraft {
    /// Permission name.
    pub name: String,
    /// Application scope.
    pub scope: Option<ApplicationId>,
}

/// Partial permission update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionUpdate {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement scope. `Some(None)` clears it.
    pub scope: Option<Option<ApplicationId>>,
}

/// Input payload for attaching a policy to a permission.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    /// Policy name.
    pub name: String,
    /// Resource pattern.
    pub resource: String,
    /// Normalized verbs.
    pub verbs: Vec<String>,
    /// Allow or deny.
    pub effect: PolicyEffect,
    /// Opaque conditions.
    pub conditions: Value,
}

/// Partial policy update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyUpdate {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement resource pattern.
    pub resource: Option<String>,
    /// Replacement verbs.
    pub verbs: Option<Vec<String>>,
    /// Replacement effect.
    pub effect: Option<PolicyEffect>,
    /// Replacement conditions.
    pub conditions: Option<Value>,
}

/// Repository port for roles, permissions and permission policies.
///
/// Every operation is scoped to an organisation; rows owned by another
/// organisation behave as if they did not exist.
#[async_trait]
pub trait AccessControlRepository: Send + Sync {
    /// Lists roles, optionally restricted to ids.
    async fn list_roles(
        &self,
        organisation_id: OrganisationId,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>>;

    /// Creates a role.
    async fn create_role(&self, organisation_id: OrganisationId, draft: RoleDraft)
    -> AppResult<Role>;

    /// Updates a role.
    async fn update_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role>;

    /// Deletes a role and detaches it from trusts and API keys.
    async fn delete_role(&self, organisation_id: OrganisationId, role_id: RoleId)
    -> AppResult<Role>;

    /// Lists permissions with their policies, optionally restricted to ids.
    async fn list_permissions(
        &self,
        organisation_id: OrganisationId,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>>;

    /// Creates a permission.
    async fn create_permission(
        &self,
        organisation_id: OrganisationId,
        draft: PermissionDraft,
    ) -> AppResult<Permission>;

    /// Updates a permission.
    async fn update_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission>;

    /// Deletes a permission, its policies and every grant of it.
    async fn delete_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<Permission>;

    /// Attaches a policy to a permission of the organisation.
    async fn create_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy>;

    /// Updates a policy of a permission of the organisation.
    async fn update_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy>;

    /// Deletes a policy of a permission of the organisation.
    async fn delete_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy>;
}
