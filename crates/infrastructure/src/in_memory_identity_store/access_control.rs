use trustgate_application::{
    AccessControlRepository, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate,
    RoleDraft, RoleUpdate,
};
use trustgate_domain::{PermissionPolicy, PolicyId};

use super::*;

fn policy_not_found(policy_id: PolicyId) -> AppError {
    AppError::NotFound(format!("policy '{policy_id}' does not exist"))
}

#[async_trait]
impl AccessControlRepository for InMemoryIdentityStore {
    async fn list_roles(
        &self,
        organisation_id: OrganisationId,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| role.organisation_id == organisation_id)
            .cloned()
            .collect();
        retain_requested(&mut roles, role_ids, |role| role.id);
        roles.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));

        Ok(roles)
    }

    async fn create_role(
        &self,
        organisation_id: OrganisationId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        let role = Role {
            id: RoleId::new(),
            organisation_id,
            name: draft.name,
            permission_ids: draft.permission_ids,
            application_ids: draft.application_ids,
        };
        self.state.write().await.roles.insert(role.id, role.clone());

        Ok(role)
    }

    async fn update_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role = state.owned_role_mut(organisation_id, role_id)?;

        if let Some(name) = update.name {
            role.name = name;
        }
        if let Some(permission_ids) = update.permission_ids {
            role.permission_ids = permission_ids;
        }
        if let Some(application_ids) = update.application_ids {
            role.application_ids = application_ids;
        }

        Ok(role.clone())
    }

    async fn delete_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        let mut state = self.state.write().await;
        state.owned_role_mut(organisation_id, role_id)?;

        for trust in state.trusts.values_mut() {
            trust.role_ids.retain(|id| *id != role_id);
        }
        for (api_key, _) in state.api_keys.values_mut() {
            api_key.role_ids.retain(|id| *id != role_id);
        }

        state
            .roles
            .remove(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn list_permissions(
        &self,
        organisation_id: OrganisationId,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state
            .permissions
            .values()
            .filter(|permission| permission.organisation_id == organisation_id)
            .cloned()
            .collect();
        retain_requested(&mut permissions, permission_ids, |permission| permission.id);
        permissions.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));

        Ok(permissions)
    }

    async fn create_permission(
        &self,
        organisation_id: OrganisationId,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        let permission = Permission {
            id: PermissionId::new(),
            organisation_id,
            name: draft.name,
            scope: draft.scope,
            policies: Vec::new(),
        };
        self.state
            .write()
            .await
            .permissions
            .insert(permission.id, permission.clone());

        Ok(permission)
    }

    async fn update_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        let permission = state.owned_permission_mut(organisation_id, permission_id)?;

        if let Some(name) = update.name {
            permission.name = name;
        }
        if let Some(scope) = update.scope {
            permission.scope = scope;
        }

        Ok(permission.clone())
    }

    async fn delete_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        state.owned_permission_mut(organisation_id, permission_id)?;

        for trust in state.trusts.values_mut() {
            trust.permission_ids.retain(|id| *id != permission_id);
        }
        for role in state.roles.values_mut() {
            role.permission_ids.retain(|id| *id != permission_id);
        }

        state.permissions.remove(&permission_id).ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' does not exist"))
        })
    }

    async fn create_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.write().await;
        let permission = state.owned_permission_mut(organisation_id, permission_id)?;
        let policy = PermissionPolicy {
            id: PolicyId::new(),
            permission_id,
            name: draft.name,
            resource: draft.resource,
            verbs: draft.verbs,
            effect: draft.effect,
            conditions: draft.conditions,
        };
        permission.policies.push(policy.clone());

        Ok(policy)
    }

    async fn update_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.write().await;
        let policy = state
            .owned_permission_mut(organisation_id, permission_id)?
            .policies
            .iter_mut()
            .find(|policy| policy.id == policy_id)
            .ok_or_else(|| policy_not_found(policy_id))?;

        if let Some(name) = update.name {
            policy.name = name;
        }
        if let Some(resource) = update.resource {
            policy.resource = resource;
        }
        if let Some(verbs) = update.verbs {
            policy.verbs = verbs;
        }
        if let Some(effect) = update.effect {
            policy.effect = effect;
        }
        if let Some(conditions) = update.conditions {
            policy.conditions = conditions;
        }

        Ok(policy.clone())
    }

    async fn delete_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.write().await;
        let policies = &mut state
            .owned_permission_mut(organisation_id, permission_id)?
            .policies;
        let index = policies
            .iter()
            .position(|policy| policy.id == policy_id)
            .ok_or_else(|| policy_not_found(policy_id))?;

        Ok(policies.remove(index))
    }
}
