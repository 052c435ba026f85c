use std::collections::HashMap;

use super::policies::load_policies;
use super::*;

#[derive(Debug, sqlx::FromRow)]
struct PermissionRow {
    id: Uuid,
    organisation_id: Uuid,
    name: String,
    scope_application_id: Option<Uuid>,
}

async fn load_permissions(
    connection: &mut sqlx::PgConnection,
    organisation_id: OrganisationId,
    permission_ids: Option<Vec<Uuid>>,
) -> AppResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, PermissionRow>(
        r#"
        SELECT id, organisation_id, name, scope_application_id
        FROM permissions
        WHERE organisation_id = $1
          AND ($2::uuid[] IS NULL OR id = ANY($2))
        ORDER BY name, id
        "#,
    )
    .bind(organisation_id.as_uuid())
    .bind(permission_ids)
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut policies_by_permission: HashMap<PermissionId, Vec<PermissionPolicy>> = HashMap::new();
    for policy in load_policies(&mut *connection, &ids).await? {
        policies_by_permission
            .entry(policy.permission_id)
            .or_default()
            .push(policy);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = PermissionId::from_uuid(row.id);
            Permission {
                id,
                organisation_id: OrganisationId::from_uuid(row.organisation_id),
                name: row.name,
                scope: row.scope_application_id.map(ApplicationId::from_uuid),
                policies: policies_by_permission.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

async fn load_permission(
    connection: &mut sqlx::PgConnection,
    organisation_id: OrganisationId,
    permission_id: PermissionId,
) -> AppResult<Permission> {
    load_permissions(
        connection,
        organisation_id,
        Some(vec![permission_id.as_uuid()]),
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| permission_not_found(permission_id))
}

pub(super) fn permission_not_found(permission_id: PermissionId) -> AppError {
    AppError::NotFound(format!("permission '{permission_id}' does not exist"))
}

impl PostgresAccessControlRepository {
    pub(super) async fn list_permissions_impl(
        &self,
        organisation_id: OrganisationId,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire connection: {error}"))
        })?;

        load_permissions(
            &mut connection,
            organisation_id,
            permission_ids.map(|ids| uuids(ids, PermissionId::as_uuid)),
        )
        .await
    }

    pub(super) async fn create_permission_impl(
        &self,
        organisation_id: OrganisationId,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        let permission = Permission {
            id: PermissionId::new(),
            organisation_id,
            name: draft.name,
            scope: draft.scope,
            policies: Vec::new(),
        };

        sqlx::query(
            r#"
            INSERT INTO permissions (id, organisation_id, name, scope_application_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(permission.id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(permission.name.as_str())
        .bind(permission.scope.map(|scope| scope.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create permission: {error}")))?;

        Ok(permission)
    }

    pub(super) async fn update_permission_impl(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission> {
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET name = COALESCE($3, name),
                scope_application_id = CASE WHEN $4 THEN $5 ELSE scope_application_id END
            WHERE id = $1 AND organisation_id = $2
            "#,
        )
        .bind(permission_id.as_uuid())
        .bind(organisation_id.as_uuid())
        .bind(update.name.as_deref())
        .bind(update.scope.is_some())
        .bind(update.scope.flatten().map(|scope| scope.as_uuid()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(permission_not_found(permission_id));
        }

        let permission = load_permission(&mut transaction, organisation_id, permission_id).await?;
        commit(transaction).await?;

        Ok(permission)
    }

    pub(super) async fn delete_permission_impl(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        let mut transaction = self.begin().await?;
        let permission = load_permission(&mut transaction, organisation_id, permission_id).await?;

        sqlx::query("DELETE FROM permissions WHERE id = $1 AND organisation_id = $2")
            .bind(permission_id.as_uuid())
            .bind(organisation_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete permission: {error}"))
            })?;

        commit(transaction).await?;

        Ok(permission)
    }
}
