use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trustgate_application::{AuditEvent, AuditRepository};
use trustgate_core::{AppError, AppResult};

/// Audit trail stored in `audit_events`, one row per event, indexed by the
/// resource it touched.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let AuditEvent {
            organisation_id,
            subject,
            action,
            resource_type,
            resource_id,
            detail,
        } = event;

        sqlx::query(
            r#"
            INSERT INTO audit_events
                (id, organisation_id, actor, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organisation_id.as_uuid())
        .bind(subject.as_str())
        .bind(action.as_str())
        .bind(resource_type.as_str())
        .bind(resource_id.as_str())
        .bind(detail.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!(
                    "organisation '{organisation_id}' does not exist"
                ));
            }
            AppError::Internal(format!(
                "failed to record {} on {resource_type} '{resource_id}': {error}",
                action.as_str()
            ))
        })?;

        Ok(())
    }
}
