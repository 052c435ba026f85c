use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, inactive, last_organisation_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(User::from))
    }

    pub(super) async fn find_credentials_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, name, email, inactive, last_organisation_id, password_hash
            FROM users
            WHERE lower(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        Ok(row.map(|row| UserCredentials {
            user: row.user.into(),
            password_hash: row.password_hash,
        }))
    }

    pub(super) async fn create_user_impl(
        &self,
        email: &EmailAddress,
        name: Option<&str>,
    ) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, inactive, last_organisation_id
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(name)
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        Ok(row.into())
    }

    pub(super) async fn update_user_name_impl(&self, user_id: UserId, name: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user name: {error}")))?;

        ensure_user_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn set_password_hash_impl(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        ensure_user_updated(result.rows_affected(), user_id)
    }

    pub(super) async fn set_last_organisation_impl(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_organisation_id = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record last organisation: {error}"))
        })?;

        ensure_user_updated(result.rows_affected(), user_id)
    }
}
