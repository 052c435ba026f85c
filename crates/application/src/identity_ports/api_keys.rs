use async_trait::async_trait;
use trustgate_core::{AppResult, OrganisationId};
use trustgate_domain::{ApiKey, ApiKeyId, RoleId};

/// Input payload for storing a freshly issued key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    /// Key label.
    pub name: String,
    /// SHA-256 hex digest of the secret.
    pub key_digest: String,
    /// Roles the key acts with.
    pub role_ids: Vec<RoleId>,
}

/// Partial API key update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyUpdate {
    /// Replacement label.
    pub name: Option<String>,
    /// Replacement role set.
    pub role_ids: Option<Vec<RoleId>>,
}

/// Repository port for organisation API keys.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Lists keys of an organisation.
    async fn list_api_keys(&self, organisation_id: OrganisationId) -> AppResult<Vec<ApiKey>>;

    /// Stores a key digest.
    async fn create_api_key(
        &self,
        organisation_id: OrganisationId,
        key: NewApiKey,
    ) -> AppResult<ApiKey>;

    /// Updates a key.
    async fn update_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> AppResult<ApiKey>;

    /// Revokes a key.
    async fn delete_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
    ) -> AppResult<ApiKey>;

    /// Resolves a key by secret digest.
    async fn find_api_key_by_digest(&self, key_digest: &str) -> AppResult<Option<ApiKey>>;
}
