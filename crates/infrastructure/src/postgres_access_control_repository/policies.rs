use std::str::FromStr;

use super::permissions::permission_not_found;
use super::*;

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    id: Uuid,
    permission_id: Uuid,
    name: String,
    resource: String,
    verbs: Vec<String>,
    effect: String,
    conditions: Value,
}

impl TryFrom<PolicyRow> for PermissionPolicy {
    type Error = AppError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PolicyId::from_uuid(row.id),
            permission_id: PermissionId::from_uuid(row.permission_id),
            name: row.name,
            resource: row.resource,
            verbs: row.verbs,
            effect: PolicyEffect::from_str(row.effect.as_str())?,
            conditions: row.conditions,
        })
    }
}

pub(super) async fn load_policies(
    connection: &mut sqlx::PgConnection,
    permission_ids: &[Uuid],
) -> AppResult<Vec<PermissionPolicy>> {
    let rows = sqlx::query_as::<_, PolicyRow>(
        r#"
        SELECT id, permission_id, name, resource, verbs, effect, conditions
        FROM permission_policies
        WHERE permission_id = ANY($1)
        ORDER BY created_at, id
        "#,
    )
    .bind(permission_ids)
    .fetch_all(connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to list policies: {error}")))?;

    rows.into_iter().map(PermissionPolicy::try_from).collect()
}

async fn ensure_permission_owned(
    connection: &mut sqlx::PgConnection,
    organisation_id: OrganisationId,
    permission_id: PermissionId,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM permissions WHERE id = $1 AND organisation_id = $2
        )
        "#,
    )
    .bind(permission_id.as_uuid())
    .bind(organisation_id.as_uuid())
    .fetch_one(connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to check permission: {error}")))?;

    if !exists {
        return Err(permission_not_found(permission_id));
    }

    Ok(())
}

fn policy_not_found(policy_id: PolicyId) -> AppError {
    AppError::NotFound(format!("policy '{policy_id}' does not exist"))
}

impl PostgresAccessControlRepository {
    pub(super) async fn create_policy_impl(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy> {
        let mut transaction = self.begin().await?;
        ensure_permission_owned(&mut transaction, organisation_id, permission_id).await?;

        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            INSERT INTO permission_policies (
                id,
                permission_id,
                name,
                resource,
                verbs,
                effect,
                conditions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, permission_id, name, resource, verbs, effect, conditions
            "#,
        )
        .bind(PolicyId::new().as_uuid())
        .bind(permission_id.as_uuid())
        .bind(draft.name)
        .bind(draft.resource)
        .bind(draft.verbs)
        .bind(draft.effect.as_str())
        .bind(draft.conditions)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create policy: {error}")))?;

        commit(transaction).await?;

        row.try_into()
    }

    pub(super) async fn update_policy_impl(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy> {
        let mut transaction = self.begin().await?;
        ensure_permission_owned(&mut transaction, organisation_id, permission_id).await?;

        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            UPDATE permission_policies
            SET name = COALESCE($3, name),
                resource = COALESCE($4, resource),
                verbs = COALESCE($5, verbs),
                effect = COALESCE($6, effect),
                conditions = COALESCE($7, conditions)
            WHERE id = $1 AND permission_id = $2
            RETURNING id, permission_id, name, resource, verbs, effect, conditions
            "#,
        )
        .bind(policy_id.as_uuid())
        .bind(permission_id.as_uuid())
        .bind(update.name)
        .bind(update.resource)
        .bind(update.verbs)
        .bind(update.effect.map(|effect| effect.as_str()))
        .bind(update.conditions)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update policy: {error}")))?
        .ok_or_else(|| policy_not_found(policy_id))?;

        commit(transaction).await?;

        row.try_into()
    }

    pub(super) async fn delete_policy_impl(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy> {
        let mut transaction = self.begin().await?;
        ensure_permission_owned(&mut transaction, organisation_id, permission_id).await?;

        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            DELETE FROM permission_policies
            WHERE id = $1 AND permission_id = $2
            RETURNING id, permission_id, name, resource, verbs, effect, conditions
            "#,
        )
        .bind(policy_id.as_uuid())
        .bind(permission_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete policy: {error}")))?
        .ok_or_else(|| policy_not_found(policy_id))?;

        commit(transaction).await?;

        row.try_into()
    }
}
