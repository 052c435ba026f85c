//! PostgreSQL-backed application registry.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trustgate_application::{ApplicationInput, ApplicationRepository};
use trustgate_core::{AppError, AppResult};
use trustgate_domain::{Application, ApplicationId};

/// PostgreSQL implementation of the application registry port.
#[derive(Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ApplicationRow {
    id: Uuid,
    name: String,
    backend_url: Option<String>,
    entrypoint: Option<String>,
    slug: String,
    public_key: Option<String>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: ApplicationId::from_uuid(row.id),
            name: row.name,
            backend_url: row.backend_url,
            entrypoint: row.entrypoint,
            slug: row.slug,
            public_key: row.public_key,
        }
    }
}

fn slug_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(
            "an application with this slug or public key already exists".to_owned(),
        );
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn list_applications(
        &self,
        application_ids: Option<&[ApplicationId]>,
    ) -> AppResult<Vec<Application>> {
        let ids: Option<Vec<Uuid>> =
            application_ids.map(|ids| ids.iter().map(ApplicationId::as_uuid).collect());

        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, name, backend_url, entrypoint, slug, public_key
            FROM applications
            WHERE $1::uuid[] IS NULL OR id = ANY($1)
            ORDER BY slug
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list applications: {error}")))?;

        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn find_application_by_slug(&self, slug: &str) -> AppResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, name, backend_url, entrypoint, slug, public_key
            FROM applications
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find application by slug: {error}"))
        })?;

        Ok(row.map(Application::from))
    }

    async fn find_application_by_public_key(
        &self,
        public_key: &str,
    ) -> AppResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, name, backend_url, entrypoint, slug, public_key
            FROM applications
            WHERE public_key = $1
            "#,
        )
        .bind(public_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find application by public key: {error}"))
        })?;

        Ok(row.map(Application::from))
    }

    async fn create_application(&self, input: ApplicationInput) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (id, name, backend_url, entrypoint, slug, public_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, backend_url, entrypoint, slug, public_key
            "#,
        )
        .bind(ApplicationId::new().as_uuid())
        .bind(input.name)
        .bind(input.backend_url)
        .bind(input.entrypoint)
        .bind(input.slug)
        .bind(input.public_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| slug_conflict_or_internal(error, "create application"))?;

        Ok(row.into())
    }

    async fn update_application(
        &self,
        application_id: ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET name = $2, backend_url = $3, entrypoint = $4, slug = $5, public_key = $6
            WHERE id = $1
            RETURNING id, name, backend_url, entrypoint, slug, public_key
            "#,
        )
        .bind(application_id.as_uuid())
        .bind(input.name)
        .bind(input.backend_url)
        .bind(input.entrypoint)
        .bind(input.slug)
        .bind(input.public_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| slug_conflict_or_internal(error, "update application"))?;

        row.map(Application::from).ok_or_else(|| {
            AppError::NotFound(format!("application '{application_id}' does not exist"))
        })
    }

    async fn delete_application(&self, application_id: ApplicationId) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            DELETE FROM applications
            WHERE id = $1
            RETURNING id, name, backend_url, entrypoint, slug, public_key
            "#,
        )
        .bind(application_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete application: {error}")))?;

        row.map(Application::from).ok_or_else(|| {
            AppError::NotFound(format!("application '{application_id}' does not exist"))
        })
    }
}
