use trustgate_domain::{Role, RoleId, normalize_name};

use super::*;
use crate::ownership::{dedup_ids, ensure_applications_exist, ensure_permissions_owned};
use crate::{RoleDraft, RoleUpdate};

impl AccessControlService {
    /// Lists roles of the caller's organisation, optionally restricted to ids.
    pub async fn list_roles(
        &self,
        caller: &CallerIdentity,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>> {
        self.authorization_service.require_member(caller).await?;
        self.repository
            .list_roles(caller.organisation_id(), role_ids)
            .await
    }

    /// Creates a role in the caller's organisation.
    pub async fn create_role(&self, caller: &CallerIdentity, draft: RoleDraft) -> AppResult<Role> {
        self.authorization_service.require_member(caller).await?;

        let draft = RoleDraft {
            name: normalize_name(&draft.name, "role")?,
            permission_ids: dedup_ids(&draft.permission_ids),
            application_ids: dedup_ids(&draft.application_ids),
        };
        ensure_permissions_owned(
            self.repository.as_ref(),
            caller.organisation_id(),
            &draft.permission_ids,
        )
        .await?;
        ensure_applications_exist(self.application_repository.as_ref(), &draft.application_ids)
            .await?;

        let role = self
            .repository
            .create_role(caller.organisation_id(), draft)
            .await?;

        self.audit(
            caller,
            AuditAction::RoleCreated,
            "role",
            role.id.to_string(),
            format!("created role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }

    /// Updates a role of the caller's organisation.
    pub async fn update_role(
        &self,
        caller: &CallerIdentity,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        self.authorization_service.require_member(caller).await?;

        let update = RoleUpdate {
            name: update
                .name
                .as_deref()
                .map(|name| normalize_name(name, "role"))
                .transpose()?,
            permission_ids: update.permission_ids.as_deref().map(dedup_ids),
            application_ids: update.application_ids.as_deref().map(dedup_ids),
        };
        if let Some(permission_ids) = &update.permission_ids {
            ensure_permissions_owned(
                self.repository.as_ref(),
                caller.organisation_id(),
                permission_ids,
            )
            .await?;
        }
        if let Some(application_ids) = &update.application_ids {
            ensure_applications_exist(self.application_repository.as_ref(), application_ids)
                .await?;
        }

        let role = self
            .repository
            .update_role(caller.organisation_id(), role_id, update)
            .await?;

        self.audit(
            caller,
            AuditAction::RoleUpdated,
            "role",
            role.id.to_string(),
            format!("updated role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a role of the caller's organisation.
    pub async fn delete_role(&self, caller: &CallerIdentity, role_id: RoleId) -> AppResult<Role> {
        self.authorization_service.require_member(caller).await?;

        let role = self
            .repository
            .delete_role(caller.organisation_id(), role_id)
            .await?;

        self.audit(
            caller,
            AuditAction::RoleDeleted,
            "role",
            role.id.to_string(),
            format!("deleted role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }
}
