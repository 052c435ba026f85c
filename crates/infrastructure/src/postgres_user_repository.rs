//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trustgate_application::{MemberQuery, OrganisationMember, UserCredentials, UserRepository};
use trustgate_core::{AppError, AppResult, OrganisationId, UserId};
use trustgate_domain::{EmailAddress, User};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    inactive: bool,
    last_organisation_id: Option<Uuid>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            inactive: row.inactive,
            last_organisation: row.last_organisation_id.map(OrganisationId::from_uuid),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

mod account;
mod members;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .find_credentials_by_email_impl(email)
            .await?
            .map(|credentials| credentials.user))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        self.find_credentials_by_email_impl(email).await
    }

    async fn create_user(&self, email: &EmailAddress, name: Option<&str>) -> AppResult<User> {
        self.create_user_impl(email, name).await
    }

    async fn update_user_name(&self, user_id: UserId, name: &str) -> AppResult<()> {
        self.update_user_name_impl(user_id, name).await
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.set_password_hash_impl(user_id, password_hash).await
    }

    async fn set_last_organisation(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<()> {
        self.set_last_organisation_impl(user_id, organisation_id)
            .await
    }

    async fn list_organisation_members(
        &self,
        organisation_id: OrganisationId,
        query: &MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>> {
        self.list_organisation_members_impl(organisation_id, query)
            .await
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an account with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

fn ensure_user_updated(rows_affected: u64, user_id: UserId) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
    }

    Ok(())
}
