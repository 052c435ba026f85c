use async_trait::async_trait;
use trustgate_core::{AppResult, OrganisationId, UserId};
use trustgate_domain::{PermissionId, RoleId, Trust};

/// Input payload for issuing a trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrust {
    /// Trusted user.
    pub user_id: UserId,
    /// Issuing organisation.
    pub organisation_id: OrganisationId,
    /// Free-form membership type.
    pub trust_type: Option<String>,
    /// Issuer.
    pub issued_by: UserId,
    /// Granted roles.
    pub role_ids: Vec<RoleId>,
    /// Directly granted permissions.
    pub permission_ids: Vec<PermissionId>,
}

/// Partial update for an existing trust. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustChanges {
    /// Replacement membership type.
    pub trust_type: Option<String>,
    /// Replacement role set.
    pub role_ids: Option<Vec<RoleId>>,
    /// Replacement permission set.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// New deactivation flag.
    pub inactive: Option<bool>,
    /// User applying the change.
    pub modified_by: UserId,
}

/// Repository port for trusts.
#[async_trait]
pub trait TrustRepository: Send + Sync {
    /// Finds the trust for a pair.
    async fn find_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Trust>>;

    /// Lists every trust held by a user.
    async fn list_trusts_for_user(&self, user_id: UserId) -> AppResult<Vec<Trust>>;

    /// Creates a pending trust. An existing pair conflicts.
    async fn create_trust(&self, trust: NewTrust) -> AppResult<Trust>;

    /// Applies changes to an existing trust.
    async fn update_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
        changes: TrustChanges,
    ) -> AppResult<Trust>;

    /// Marks a trust as accepted.
    async fn accept_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Trust>;
}
