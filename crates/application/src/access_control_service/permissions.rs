use trustgate_domain::{Permission, PermissionId, normalize_name};

use super::*;
use crate::ownership::ensure_applications_exist;
use crate::{PermissionDraft, PermissionUpdate};

impl AccessControlService {
    /// Lists permissions of the caller's organisation with their policies.
    pub async fn list_permissions(
        &self,
        caller: &CallerIdentity,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        self.authorization_service.require_member(caller).await?;
        self.repository
            .list_permissions(caller.organisation_id(), permission_ids)
            .await
    }

    /// Creates a permission in the caller's organisation.
    pub async fn create_permission(
        &self,
        caller: &CallerIdentity,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        self.authorization_service.require_member(caller).await?;

        let draft = PermissionDraft {
            name: normalize_name(&draft.name, "permission")?,
            scope: draft.scope,
        };
        if let Some(scope) = draft.scope {
            ensure_applications_exist(self.application_repository.as_ref(), &[scope]).await?;
        }

        let permission = self
            .repository
            .create_permission(caller.organisation_id(), draft)
            .await?;

        self.audit(
            caller,
            AuditAction::PermissionCreated,
            "permission",
            permission.id.to_string(),
            format!("created permission '{}'", permission.name),
        )
        .await?;

        Ok(permission)
    }

    /// Updates a permission of the caller's organisation.
    pub async fn update_permission(
        &self,
        caller: &CallerIdentity,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission> {
        self.authorization_service.require_member(caller).await?;

        let update = PermissionUpdate {
            name: update
                .name
                .as_deref()
                .map(|name| normalize_name(name, "permission"))
                .transpose()?,
            scope: update.scope,
        };
        if let Some(Some(scope)) = update.scope {
            ensure_applications_exist(self.application_repository.as_ref(), &[scope]).await?;
        }

        let permission = self
            .repository
            .update_permission(caller.organisation_id(), permission_id, update)
            .await?;

        self.audit(
            caller,
            AuditAction::PermissionUpdated,
            "permission",
            permission.id.to_string(),
            format!("updated permission '{}'", permission.name),
        )
        .await?;

        Ok(permission)
    }

    /// Deletes a permission of the caller's organisation.
    pub async fn delete_permission(
        &self,
        caller: &CallerIdentity,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.authorization_service.require_member(caller).await?;

        let permission = self
            .repository
            .delete_permission(caller.organisation_id(), permission_id)
            .await?;

        self.audit(
            caller,
            AuditAction::PermissionDeleted,
            "permission",
            permission.id.to_string(),
            format!("deleted permission '{}'", permission.name),
        )
        .await?;

        Ok(permission)
    }
}
