//! PostgreSQL-backed organisation repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trustgate_application::{OrganisationRepository, SeededOrganisation};
use trustgate_core::{AppError, AppResult, OrganisationId};
use trustgate_domain::{Application, ApplicationId, Organisation, Role, RoleId};

use crate::postgres_application_repository::ApplicationRow;

/// PostgreSQL implementation of the organisation repository port.
#[derive(Clone)]
pub struct PostgresOrganisationRepository {
    pool: PgPool,
}

impl PostgresOrganisationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrganisationRow {
    id: Uuid,
    name: String,
}

impl From<OrganisationRow> for Organisation {
    fn from(row: OrganisationRow) -> Self {
        Self {
            id: OrganisationId::from_uuid(row.id),
            name: row.name,
        }
    }
}

#[async_trait]
impl OrganisationRepository for PostgresOrganisationRepository {
    async fn find_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Organisation>> {
        let row = sqlx::query_as::<_, OrganisationRow>(
            r#"
            SELECT id, name
            FROM organisations
            WHERE id = $1
            "#,
        )
        .bind(organisation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find organisation: {error}")))?;

        Ok(row.map(Organisation::from))
    }

    async fn list_organisations(
        &self,
        organisation_ids: &[OrganisationId],
    ) -> AppResult<Vec<Organisation>> {
        let ids: Vec<Uuid> = organisation_ids
            .iter()
            .map(OrganisationId::as_uuid)
            .collect();

        let rows = sqlx::query_as::<_, OrganisationRow>(
            r#"
            SELECT id, name
            FROM organisations
            WHERE id = ANY($1)
            ORDER BY name, id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list organisations: {error}")))?;

        Ok(rows.into_iter().map(Organisation::from).collect())
    }

    async fn create_organisation(
        &self,
        name: &str,
        default_role_name: &str,
    ) -> AppResult<SeededOrganisation> {
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: name.to_owned(),
        };
        let default_role = Role {
            id: RoleId::new(),
            organisation_id: organisation.id,
            name: default_role_name.to_owned(),
            permission_ids: Vec::new(),
            application_ids: Vec::new(),
        };

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO organisations (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(organisation.id.as_uuid())
        .bind(organisation.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create organisation: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, organisation_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(default_role.id.as_uuid())
        .bind(organisation.id.as_uuid())
        .bind(default_role.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to seed default role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(SeededOrganisation {
            organisation,
            default_role,
        })
    }

    async fn rename_organisation(
        &self,
        organisation_id: OrganisationId,
        name: &str,
    ) -> AppResult<Organisation> {
        let row = sqlx::query_as::<_, OrganisationRow>(
            r#"
            UPDATE organisations
            SET name = $2
            WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(organisation_id.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to rename organisation: {error}")))?;

        row.map(Organisation::from).ok_or_else(|| {
            AppError::NotFound(format!("organisation '{organisation_id}' does not exist"))
        })
    }

    async fn list_installed_applications(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT a.id, a.name, a.backend_url, a.entrypoint, a.slug, a.public_key
            FROM applications a
            INNER JOIN organisation_applications oa ON oa.application_id = a.id
            WHERE oa.organisation_id = $1
            ORDER BY a.slug
            "#,
        )
        .bind(organisation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list installed applications: {error}"))
        })?;

        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn install_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organisation_applications (organisation_id, application_id)
            VALUES ($1, $2)
            ON CONFLICT (organisation_id, application_id) DO NOTHING
            "#,
        )
        .bind(organisation_id.as_uuid())
        .bind(application_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to install application: {error}")))?;

        Ok(())
    }

    async fn uninstall_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM organisation_applications
            WHERE organisation_id = $1 AND application_id = $2
            "#,
        )
        .bind(organisation_id.as_uuid())
        .bind(application_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to uninstall application: {error}"))
        })?;

        Ok(())
    }
}
