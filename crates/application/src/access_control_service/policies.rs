use trustgate_core::AppError;
use trustgate_domain::{PermissionId, PermissionPolicy, PolicyId, normalize_name, normalize_verbs};

use super::*;
use crate::{PolicyDraft, PolicyUpdate};

fn normalize_resource(resource: &str) -> AppResult<String> {
    let resource = resource.trim();
    if resource.is_empty() {
        return Err(AppError::Validation(
            "policy resource must not be empty".to_owned(),
        ));
    }

    Ok(resource.to_owned())
}

impl AccessControlService {
    /// Attaches a policy to a permission of the caller's organisation.
    ///
    /// Permissions of other organisations are reported as not found.
    pub async fn create_policy(
        &self,
        caller: &CallerIdentity,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy> {
        self.authorization_service.require_member(caller).await?;

        let draft = PolicyDraft {
            name: normalize_name(&draft.name, "policy")?,
            resource: normalize_resource(&draft.resource)?,
            verbs: normalize_verbs(&draft.verbs)?,
            effect: draft.effect,
            conditions: draft.conditions,
        };

        let policy = self
            .repository
            .create_policy(caller.organisation_id(), permission_id, draft)
            .await?;

        self.audit(
            caller,
            AuditAction::PolicyCreated,
            "permission_policy",
            policy.id.to_string(),
            format!(
                "{} '{}' on '{}' for permission '{permission_id}'",
                policy.effect.as_str(),
                policy.verbs.join(","),
                policy.resource
            ),
        )
        .await?;

        Ok(policy)
    }

    /// Updates a policy of a permission of the caller's organisation.
    pub async fn update_policy(
        &self,
        caller: &CallerIdentity,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy> {
        self.authorization_service.require_member(caller).await?;

        let update = PolicyUpdate {
            name: update
                .name
                .as_deref()
                .map(|name| normalize_name(name, "policy"))
                .transpose()?,
            resource: update
                .resource
                .as_deref()
                .map(normalize_resource)
                .transpose()?,
            verbs: update.verbs.as_deref().map(normalize_verbs).transpose()?,
            effect: update.effect,
            conditions: update.conditions,
        };

        let policy = self
            .repository
            .update_policy(caller.organisation_id(), permission_id, policy_id, update)
            .await?;

        self.audit(
            caller,
            AuditAction::PolicyUpdated,
            "permission_policy",
            policy.id.to_string(),
            format!("updated policy '{}'", policy.name),
        )
        .await?;

        Ok(policy)
    }

    /// Deletes a policy of a permission of the caller's organisation.
    pub async fn delete_policy(
        &self,
        caller: &CallerIdentity,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy> {
        self.authorization_service.require_member(caller).await?;

        let policy = self
            .repository
            .delete_policy(caller.organisation_id(), permission_id, policy_id)
            .await?;

        self.audit(
            caller,
            AuditAction::PolicyDeleted,
            "permission_policy",
            policy.id.to_string(),
            format!("deleted policy '{}'", policy.name),
        )
        .await?;

        Ok(policy)
    }
}
