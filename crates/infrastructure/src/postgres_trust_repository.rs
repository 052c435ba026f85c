//! PostgreSQL-backed trust repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use trustgate_application::{NewTrust, TrustChanges, TrustRepository};
use trustgate_core::{AppError, AppResult, OrganisationId, UserId};
use trustgate_domain::{PermissionId, RoleId, Trust};

/// PostgreSQL implementation of the trust repository port.
#[derive(Clone)]
pub struct PostgresTrustRepository {
    pool: PgPool,
}

impl PostgresTrustRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrustRow {
    user_id: Uuid,
    organisation_id: Uuid,
    trust_type: Option<String>,
    accepted: bool,
    inactive: bool,
    issued_by: Option<Uuid>,
    role_ids: Vec<Uuid>,
    permission_ids: Vec<Uuid>,
}

impl From<TrustRow> for Trust {
    fn from(row: TrustRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            organisation_id: OrganisationId::from_uuid(row.organisation_id),
            trust_type: row.trust_type,
            accepted: row.accepted,
            inactive: row.inactive,
            role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
            permission_ids: row
                .permission_ids
                .into_iter()
                .map(PermissionId::from_uuid)
                .collect(),
            issued_by: row.issued_by.map(UserId::from_uuid),
        }
    }
}

async fn load_trust<'e, E>(
    executor: E,
    user_id: Option<UserId>,
    organisation_id: Option<OrganisationId>,
) -> AppResult<Vec<Trust>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, TrustRow>(
        r#"
        SELECT
            t.user_id,
            t.organisation_id,
            t.trust_type,
            t.accepted,
            t.inactive,
            t.issued_by,
            ARRAY(
                SELECT tr.role_id
                FROM trust_roles tr
                WHERE tr.user_id = t.user_id AND tr.organisation_id = t.organisation_id
                ORDER BY tr.role_id
            ) AS role_ids,
            ARRAY(
                SELECT tp.permission_id
                FROM trust_permissions tp
                WHERE tp.user_id = t.user_id AND tp.organisation_id = t.organisation_id
                ORDER BY tp.permission_id
            ) AS permission_ids
        FROM trusts t
        WHERE ($1::uuid IS NULL OR t.user_id = $1)
          AND ($2::uuid IS NULL OR t.organisation_id = $2)
        ORDER BY t.created_at, t.organisation_id
        "#,
    )
    .bind(user_id.map(|id| id.as_uuid()))
    .bind(organisation_id.map(|id| id.as_uuid()))
    .fetch_all(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load trusts: {error}")))?;

    Ok(rows.into_iter().map(Trust::from).collect())
}

async fn replace_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    organisation_id: OrganisationId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    sqlx::query("DELETE FROM trust_roles WHERE user_id = $1 AND organisation_id = $2")
        .bind(user_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear trust roles: {error}")))?;

    let ids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();
    sqlx::query(
        r#"
        INSERT INTO trust_roles (user_id, organisation_id, role_id)
        SELECT $1, $2, role_id FROM UNNEST($3::uuid[]) AS role_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(organisation_id.as_uuid())
    .bind(ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to grant trust roles: {error}")))?;

    Ok(())
}

async fn replace_permission_grants(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    organisation_id: OrganisationId,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    sqlx::query("DELETE FROM trust_permissions WHERE user_id = $1 AND organisation_id = $2")
        .bind(user_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear trust permissions: {error}"))
        })?;

    let ids: Vec<Uuid> = permission_ids.iter().map(PermissionId::as_uuid).collect();
    sqlx::query(
        r#"
        INSERT INTO trust_permissions (user_id, organisation_id, permission_id)
        SELECT $1, $2, permission_id FROM UNNEST($3::uuid[]) AS permission_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(organisation_id.as_uuid())
    .bind(ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to grant trust permissions: {error}"))
    })?;

    Ok(())
}

fn not_found(user_id: UserId, organisation_id: OrganisationId) -> AppError {
    AppError::NotFound(format!(
        "user '{user_id}' holds no trust in organisation '{organisation_id}'"
    ))
}

#[async_trait]
impl TrustRepository for PostgresTrustRepository {
    async fn find_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Trust>> {
        Ok(load_trust(&self.pool, Some(user_id), Some(organisation_id))
            .await?
            .into_iter()
            .next())
    }

    async fn list_trusts_for_user(&self, user_id: UserId) -> AppResult<Vec<Trust>> {
        load_trust(&self.pool, Some(user_id), None).await
    }

    async fn create_trust(&self, trust: NewTrust) -> AppResult<Trust> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO trusts (user_id, organisation_id, trust_type, issued_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(trust.user_id.as_uuid())
        .bind(trust.organisation_id.as_uuid())
        .bind(trust.trust_type.as_deref())
        .bind(trust.issued_by.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "user '{}' already holds a trust in organisation '{}'",
                    trust.user_id, trust.organisation_id
                ));
            }
            AppError::Internal(format!("failed to create trust: {error}"))
        })?;

        replace_role_grants(
            &mut transaction,
            trust.user_id,
            trust.organisation_id,
            &trust.role_ids,
        )
        .await?;
        replace_permission_grants(
            &mut transaction,
            trust.user_id,
            trust.organisation_id,
            &trust.permission_ids,
        )
        .await?;

        let created = load_trust(
            &mut *transaction,
            Some(trust.user_id),
            Some(trust.organisation_id),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| not_found(trust.user_id, trust.organisation_id))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(created)
    }

    async fn update_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
        changes: TrustChanges,
    ) -> AppResult<Trust> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let result = sqlx::query(
            r#"
            UPDATE trusts
            SET trust_type = COALESCE($3, trust_type),
                inactive = COALESCE($4, inactive),
                updated_by = $5,
                updated_at = now()
            WHERE user_id = $1 AND organisation_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(changes.trust_type.as_deref())
        .bind(changes.inactive)
        .bind(changes.modified_by.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update trust: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(not_found(user_id, organisation_id));
        }

        if let Some(role_ids) = changes.role_ids.as_deref() {
            replace_role_grants(&mut transaction, user_id, organisation_id, role_ids).await?;
        }
        if let Some(permission_ids) = changes.permission_ids.as_deref() {
            replace_permission_grants(&mut transaction, user_id, organisation_id, permission_ids)
                .await?;
        }

        let updated = load_trust(&mut *transaction, Some(user_id), Some(organisation_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(user_id, organisation_id))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(updated)
    }

    async fn accept_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Trust> {
        let result = sqlx::query(
            r#"
            UPDATE trusts
            SET accepted = true, updated_at = now()
            WHERE user_id = $1 AND organisation_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to accept trust: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(not_found(user_id, organisation_id));
        }

        self.find_trust(user_id, organisation_id)
            .await?
            .ok_or_else(|| not_found(user_id, organisation_id))
    }
}
