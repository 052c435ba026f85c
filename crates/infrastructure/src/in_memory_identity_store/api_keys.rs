use trustgate_application::{ApiKeyRepository, ApiKeyUpdate, NewApiKey};

use super::*;

fn api_key_not_found(api_key_id: ApiKeyId) -> AppError {
    AppError::NotFound(format!("api key '{api_key_id}' does not exist"))
}

#[async_trait]
impl ApiKeyRepository for InMemoryIdentityStore {
    async fn list_api_keys(&self, organisation_id: OrganisationId) -> AppResult<Vec<ApiKey>> {
        let state = self.state.read().await;
        let mut api_keys: Vec<ApiKey> = state
            .api_keys
            .values()
            .filter(|(api_key, _)| api_key.organisation_id == organisation_id)
            .map(|(api_key, _)| api_key.clone())
            .collect();
        api_keys.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));

        Ok(api_keys)
    }

    async fn create_api_key(
        &self,
        organisation_id: OrganisationId,
        key: NewApiKey,
    ) -> AppResult<ApiKey> {
        let mut state = self.state.write().await;
        if state
            .api_keys
            .values()
            .any(|(_, digest)| *digest == key.key_digest)
        {
            return Err(AppError::Conflict("api key digest already exists".to_owned()));
        }

        let api_key = ApiKey {
            id: ApiKeyId::new(),
            organisation_id,
            name: key.name,
            role_ids: key.role_ids,
        };
        state
            .api_keys
            .insert(api_key.id, (api_key.clone(), key.key_digest));

        Ok(api_key)
    }

    async fn update_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> AppResult<ApiKey> {
        let mut state = self.state.write().await;
        let (api_key, _) = state
            .api_keys
            .get_mut(&api_key_id)
            .filter(|(api_key, _)| api_key.organisation_id == organisation_id)
            .ok_or_else(|| api_key_not_found(api_key_id))?;

        if let Some(name) = update.name {
            api_key.name = name;
        }
        if let Some(role_ids) = update.role_ids {
            api_key.role_ids = role_ids;
        }

        Ok(api_key.clone())
    }

    async fn delete_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
    ) -> AppResult<ApiKey> {
        let mut state = self.state.write().await;
        let owned = state
            .api_keys
            .get(&api_key_id)
            .is_some_and(|(api_key, _)| api_key.organisation_id == organisation_id);
        if !owned {
            return Err(api_key_not_found(api_key_id));
        }

        state
            .api_keys
            .remove(&api_key_id)
            .map(|(api_key, _)| api_key)
            .ok_or_else(|| api_key_not_found(api_key_id))
    }

    async fn find_api_key_by_digest(&self, key_digest: &str) -> AppResult<Option<ApiKey>> {
        Ok(self
            .state
            .read()
            .await
            .api_keys
            .values()
            .find(|(_, digest)| digest == key_digest)
            .map(|(api_key, _)| api_key.clone()))
    }
}
