//! PostgreSQL-backed roles, permissions and permission policies.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use trustgate_application::{
    AccessControlRepository, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate,
    RoleDraft, RoleUpdate,
};
use trustgate_core::{AppError, AppResult, OrganisationId};
use trustgate_domain::{
    ApplicationId, Permission, PermissionId, PermissionPolicy, PolicyEffect, PolicyId, Role,
    RoleId,
};

/// PostgreSQL implementation of the access control repository port.
#[derive(Clone)]
pub struct PostgresAccessControlRepository {
    pool: PgPool,
}

impl PostgresAccessControlRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn uuids<T>(ids: &[T], as_uuid: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    ids.iter().map(as_uuid).collect()
}

mod permissions;
mod policies;
mod roles;

#[async_trait]
impl AccessControlRepository for PostgresAccessControlRepository {
    async fn list_roles(
        &self,
        organisation_id: OrganisationId,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>> {
        self.list_roles_impl(organisation_id, role_ids).await
    }

    async fn create_role(
        &self,
        organisation_id: OrganisationId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        self.create_role_impl(organisation_id, draft).await
    }

    async fn update_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        self.update_role_impl(organisation_id, role_id, update).await
    }

    async fn delete_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        self.delete_role_impl(organisation_id, role_id).await
    }

    async fn list_permissions(
        &self,
        organisation_id: OrganisationId,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl(organisation_id, permission_ids)
            .await
    }

    async fn create_permission(
        &self,
        organisation_id: OrganisationId,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        self.create_permission_impl(organisation_id, draft).await
    }

    async fn update_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission> {
        self.update_permission_impl(organisation_id, permission_id, update)
            .await
    }

    async fn delete_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.delete_permission_impl(organisation_id, permission_id)
            .await
    }

    async fn create_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy> {
        self.create_policy_impl(organisation_id, permission_id, draft)
            .await
    }

    async fn update_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy> {
        self.update_policy_impl(organisation_id, permission_id, policy_id, update)
            .await
    }

    async fn delete_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy> {
        self.delete_policy_impl(organisation_id, permission_id, policy_id)
            .await
    }
}
