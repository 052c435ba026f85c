use super::*;

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    organisation_id: Uuid,
    name: String,
    permission_ids: Vec<Uuid>,
    application_ids: Vec<Uuid>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::from_uuid(row.id),
            organisation_id: OrganisationId::from_uuid(row.organisation_id),
            name: row.name,
            permission_ids: row
                .permission_ids
                .into_iter()
                .map(PermissionId::from_uuid)
                .collect(),
            application_ids: row
                .application_ids
                .into_iter()
                .map(ApplicationId::from_uuid)
                .collect(),
        }
    }
}

async fn load_roles<'e, E>(
    executor: E,
    organisation_id: OrganisationId,
    role_ids: Option<Vec<Uuid>>,
) -> AppResult<Vec<Role>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT
            r.id,
            r.organisation_id,
            r.name,
            ARRAY(
                SELECT rp.permission_id FROM role_permissions rp
                WHERE rp.role_id = r.id
                ORDER BY rp.permission_id
            ) AS permission_ids,
            ARRAY(
                SELECT ra.application_id FROM role_applications ra
                WHERE ra.role_id = r.id
                ORDER BY ra.application_id
            ) AS application_ids
        FROM roles r
        WHERE r.organisation_id = $1
          AND ($2::uuid[] IS NULL OR r.id = ANY($2))
        ORDER BY r.name, r.id
        "#,
    )
    .bind(organisation_id.as_uuid())
    .bind(role_ids)
    .fetch_all(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

    Ok(rows.into_iter().map(Role::from).collect())
}

async fn load_role(
    transaction: &mut Transaction<'_, Postgres>,
    organisation_id: OrganisationId,
    role_id: RoleId,
) -> AppResult<Role> {
    load_roles(&mut **transaction, organisation_id, Some(vec![role_id.as_uuid()]))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| role_not_found(role_id))
}

fn role_not_found(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' does not exist"))
}

async fn replace_role_links(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    permission_ids: Option<&[PermissionId]>,
    application_ids: Option<&[ApplicationId]>,
) -> AppResult<()> {
    if let Some(permission_ids) = permission_ids {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut **transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear role permissions: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id FROM UNNEST($2::uuid[]) AS permission_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(uuids(permission_ids, PermissionId::as_uuid))
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to attach role permissions: {error}"))
        })?;
    }

    if let Some(application_ids) = application_ids {
        sqlx::query("DELETE FROM role_applications WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut **transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear role applications: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO role_applications (role_id, application_id)
            SELECT $1, application_id FROM UNNEST($2::uuid[]) AS application_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(uuids(application_ids, ApplicationId::as_uuid))
        .execute(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to attach role applications: {error}"))
        })?;
    }

    Ok(())
}

impl PostgresAccessControlRepository {
    pub(super) async fn list_roles_impl(
        &self,
        organisation_id: OrganisationId,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>> {
        let role_ids = role_ids.map(|ids| uuids(ids, RoleId::as_uuid));
        load_roles(&self.pool, organisation_id, role_ids).await
    }

    pub(super) async fn create_role_impl(
        &self,
        organisation_id: OrganisationId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        let role_id = RoleId::new();
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, organisation_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(draft.name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create role: {error}")))?;

        replace_role_links(
            &mut transaction,
            role_id,
            Some(draft.permission_ids.as_slice()),
            Some(draft.application_ids.as_slice()),
        )
        .await?;

        let role = load_role(&mut transaction, organisation_id, role_id).await?;
        commit(transaction).await?;

        Ok(role)
    }

    pub(super) async fn update_role_impl(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = COALESCE($3, name)
            WHERE id = $1 AND organisation_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(update.name.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(role_not_found(role_id));
        }

        replace_role_links(
            &mut transaction,
            role_id,
            update.permission_ids.as_deref(),
            update.application_ids.as_deref(),
        )
        .await?;

        let role = load_role(&mut transaction, organisation_id, role_id).await?;
        commit(transaction).await?;

        Ok(role)
    }

    pub(super) async fn delete_role_impl(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        let mut transaction = self.begin().await?;
        let role = load_role(&mut transaction, organisation_id, role_id).await?;

        sqlx::query("DELETE FROM roles WHERE id = $1 AND organisation_id = $2")
            .bind(role_id.as_uuid())
            .bind(organisation_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        commit(transaction).await?;

        Ok(role)
    }
}
