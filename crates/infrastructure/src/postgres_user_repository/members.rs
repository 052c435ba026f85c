use trustgate_domain::{PermissionId, RoleId, Trust};

use super::*;

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: Uuid,
    name: Option<String>,
    email: String,
    user_inactive: bool,
    last_organisation_id: Option<Uuid>,
    organisation_id: Uuid,
    trust_type: Option<String>,
    accepted: bool,
    trust_inactive: bool,
    issued_by: Option<Uuid>,
    role_ids: Vec<Uuid>,
    permission_ids: Vec<Uuid>,
}

impl From<MemberRow> for OrganisationMember {
    fn from(row: MemberRow) -> Self {
        let user_id = UserId::from_uuid(row.user_id);

        Self {
            user: User {
                id: user_id,
                name: row.name,
                email: row.email,
                inactive: row.user_inactive,
                last_organisation: row.last_organisation_id.map(OrganisationId::from_uuid),
            },
            trust: Trust {
                user_id,
                organisation_id: OrganisationId::from_uuid(row.organisation_id),
                trust_type: row.trust_type,
                accepted: row.accepted,
                inactive: row.trust_inactive,
                role_ids: row.role_ids.into_iter().map(RoleId::from_uuid).collect(),
                permission_ids: row
                    .permission_ids
                    .into_iter()
                    .map(PermissionId::from_uuid)
                    .collect(),
                issued_by: row.issued_by.map(UserId::from_uuid),
            },
        }
    }
}

impl PostgresUserRepository {
    pub(super) async fn list_organisation_members_impl(
        &self,
        organisation_id: OrganisationId,
        query: &MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>> {
        let user_ids: Option<Vec<Uuid>> = query
            .user_ids
            .as_ref()
            .map(|ids| ids.iter().map(UserId::as_uuid).collect());

        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.name,
                u.email,
                u.inactive AS user_inactive,
                u.last_organisation_id,
                t.organisation_id,
                t.trust_type,
                t.accepted,
                t.inactive AS trust_inactive,
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
            INNER JOIN users u ON u.id = t.user_id
            WHERE t.organisation_id = $1
              AND ($2::uuid[] IS NULL OR u.id = ANY($2))
              AND (NOT $3 OR (NOT u.inactive AND NOT t.inactive))
            ORDER BY lower(u.email)
            "#,
        )
        .bind(organisation_id.as_uuid())
        .bind(user_ids)
        .bind(query.active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list organisation members: {error}"))
        })?;

        Ok(rows.into_iter().map(OrganisationMember::from).collect())
    }
}
