//! PostgreSQL-backed API key repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use trustgate_application::{ApiKeyRepository, ApiKeyUpdate, NewApiKey};
use trustgate_core::{AppError, AppResult, OrganisationId};
use trustgate_domain::{ApiKey, ApiKeyId, RoleId};

/// PostgreSQL implementation of the API key repository port.
#[derive(Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    organisation_id: Uuid,
    name: String,
    role_ids: Vec<Uuid>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        Self {
            id: ApiKeyId::from_uuid(row.id),
            organisation_id: OrganisationId::from_uuid(row.organisation_id),
            name: row.name,
            role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
        }
    }
}

async fn load_api_keys<'e, E>(
    executor: E,
    organisation_id: Option<OrganisationId>,
    api_key_id: Option<ApiKeyId>,
    key_digest: Option<&str>,
) -> AppResult<Vec<ApiKey>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ApiKeyRow>(
        r#"
        SELECT
            k.id,
            k.organisation_id,
            k.name,
            ARRAY(
                SELECT kr.role_id FROM api_key_roles kr
                WHERE kr.api_key_id = k.id
                ORDER BY kr.role_id
            ) AS role_ids
        FROM api_keys k
        WHERE ($1::uuid IS NULL OR k.organisation_id = $1)
          AND ($2::uuid IS NULL OR k.id = $2)
          AND ($3::text IS NULL OR k.key_digest = $3)
        ORDER BY k.name, k.id
        "#,
    )
    .bind(organisation_id.map(|id| id.as_uuid()))
    .bind(api_key_id.map(|id| id.as_uuid()))
    .bind(key_digest)
    .fetch_all(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load api keys: {error}")))?;

    Ok(rows.into_iter().map(ApiKey::from).collect())
}

async fn load_api_key(
    transaction: &mut Transaction<'_, Postgres>,
    organisation_id: OrganisationId,
    api_key_id: ApiKeyId,
) -> AppResult<ApiKey> {
    load_api_keys(
        &mut **transaction,
        Some(organisation_id),
        Some(api_key_id),
        None,
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| AppError::NotFound(format!("api key '{api_key_id}' does not exist")))
}

async fn replace_key_roles(
    transaction: &mut Transaction<'_, Postgres>,
    api_key_id: ApiKeyId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    sqlx::query("DELETE FROM api_key_roles WHERE api_key_id = $1")
        .bind(api_key_id.as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear api key roles: {error}")))?;

    let ids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();
    sqlx::query(
        r#"
        INSERT INTO api_key_roles (api_key_id, role_id)
        SELECT $1, role_id FROM UNNEST($2::uuid[]) AS role_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(api_key_id.as_uuid())
    .bind(ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to attach api key roles: {error}")))?;

    Ok(())
}

impl PostgresApiKeyRepository {
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

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn list_api_keys(&self, organisation_id: OrganisationId) -> AppResult<Vec<ApiKey>> {
        load_api_keys(&self.pool, Some(organisation_id), None, None).await
    }

    async fn create_api_key(
        &self,
        organisation_id: OrganisationId,
        key: NewApiKey,
    ) -> AppResult<ApiKey> {
        let api_key_id = ApiKeyId::new();
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO api_keys (id, organisation_id, name, key_digest)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(api_key_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(key.name.as_str())
        .bind(key.key_digest.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create api key: {error}")))?;

        replace_key_roles(&mut transaction, api_key_id, &key.role_ids).await?;
        let api_key = load_api_key(&mut transaction, organisation_id, api_key_id).await?;
        commit(transaction).await?;

        Ok(api_key)
    }

    async fn update_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> AppResult<ApiKey> {
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET name = COALESCE($3, name)
            WHERE id = $1 AND organisation_id = $2
            "#,
        )
        .bind(api_key_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(update.name.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update api key: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "api key '{api_key_id}' does not exist"
            )));
        }

        if let Some(role_ids) = update.role_ids.as_deref() {
            replace_key_roles(&mut transaction, api_key_id, role_ids).await?;
        }

        let api_key = load_api_key(&mut transaction, organisation_id, api_key_id).await?;
        commit(transaction).await?;

        Ok(api_key)
    }

    async fn delete_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
    ) -> AppResult<ApiKey> {
        let mut transaction = self.begin().await?;
        let api_key = load_api_key(&mut transaction, organisation_id, api_key_id).await?;

        sqlx::query("DELETE FROM api_keys WHERE id = $1 AND organisation_id = $2")
            .bind(api_key_id.as_uuid())
            .bind(organisation_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete api key: {error}")))?;

        commit(transaction).await?;

        Ok(api_key)
    }

    async fn find_api_key_by_digest(&self, key_digest: &str) -> AppResult<Option<ApiKey>> {
        Ok(load_api_keys(&self.pool, None, None, Some(key_digest))
            .await?
            .into_iter()
            .next())
    }
}
