//! Process-local identity store for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trustgate_application::{AuditEvent, AuditRepository};
use trustgate_core::{AppError, AppResult, OrganisationId, UserId};
use trustgate_domain::{
    ApiKey, ApiKeyId, Application, ApplicationId, Organisation, Permission, PermissionId, Role,
    RoleId, Trust, User,
};

mod access_control;
mod api_keys;
mod organisations;
mod users;

#[derive(Debug, Default)]
struct IdentityState {
    organisations: HashMap<OrganisationId, Organisation>,
    installations: Vec<(OrganisationId, ApplicationId)>,
    applications: HashMap<ApplicationId, Application>,
    users: HashMap<UserId, User>,
    password_hashes: HashMap<UserId, String>,
    trusts: HashMap<(UserId, OrganisationId), Trust>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    api_keys: HashMap<ApiKeyId, (ApiKey, String)>,
    audit_events: Vec<AuditEvent>,
}

impl IdentityState {
    fn owned_role_mut(
        &mut self,
        organisation_id: OrganisationId,
        role_id: RoleId,
    ) -> AppResult<&mut Role> {
        self.roles
            .get_mut(&role_id)
            .filter(|role| role.organisation_id == organisation_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    fn owned_permission_mut(
        &mut self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<&mut Permission> {
        self.permissions
            .get_mut(&permission_id)
            .filter(|permission| permission.organisation_id == organisation_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' does not exist"))
            })
    }
}

/// In-memory implementation of every identity repository port.
///
/// All ports share one lock, so multi-row writes are atomic.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<IdentityState>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every audit event appended so far, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryIdentityStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}

/// Keeps rows whose id is requested, or all rows when no ids are given.
fn retain_requested<T, I: PartialEq>(
    rows: &mut Vec<T>,
    requested: Option<&[I]>,
    id_of: impl Fn(&T) -> I,
) {
    if let Some(requested) = requested {
        rows.retain(|row| requested.contains(&id_of(row)));
    }
}

#[cfg(test)]
mod tests;
