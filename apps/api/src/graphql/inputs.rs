use async_graphql::{InputObject, Json, MaybeUndefined};
use serde_json::Value;
use trustgate_application::{
    ApiKeyUpdate, MemberInvite, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate,
    RoleDraft, RoleUpdate, TrustGrant, TrustUpdate,
};
use trustgate_core::{AppError, AppResult};
use trustgate_domain::{ApplicationId, PermissionId, PolicyEffect, RoleId};
use uuid::Uuid;

/// Invitation or trust change for one user.
#[derive(Debug, Default, InputObject)]
pub struct UserTrustInput {
    /// Target user. Ignored on creation.
    pub id: Option<Uuid>,
    /// Name for an account created by the invite.
    pub name: Option<String>,
    /// Free-form membership type.
    #[graphql(name = "type")]
    pub trust_type: Option<String>,
    /// Email of the invitee.
    pub email: Option<String>,
    /// Deactivates or reactivates the trust.
    pub inactive: Option<bool>,
    /// Replacement role ids.
    pub roles: Option<Vec<Uuid>>,
    /// Replacement permission ids.
    pub permissions: Option<Vec<Uuid>>,
}

impl UserTrustInput {
    pub(crate) fn into_invite(self) -> MemberInvite {
        MemberInvite {
            email: self.email,
            name: self.name,
            grant: TrustGrant {
                trust_type: self.trust_type,
                role_ids: role_ids(self.roles.unwrap_or_default()),
                permission_ids: permission_ids(self.permissions.unwrap_or_default()),
            },
        }
    }

    pub(crate) fn into_update(self) -> TrustUpdate {
        TrustUpdate {
            trust_type: self.trust_type,
            role_ids: self.roles.map(role_ids),
            permission_ids: self.permissions.map(permission_ids),
            inactive: self.inactive,
        }
    }
}

/// Role fields. `name` is required on creation.
#[derive(Debug, Default, InputObject)]
pub struct RoleInput {
    pub name: Option<String>,
    /// Permission ids of the same organisation.
    pub permissions: Option<Vec<Uuid>>,
    /// Application ids the role opens up.
    pub applications: Option<Vec<Uuid>>,
}

impl RoleInput {
    pub(crate) fn into_draft(self) -> AppResult<RoleDraft> {
        Ok(RoleDraft {
            name: required(self.name, "role name")?,
            permission_ids: permission_ids(self.permissions.unwrap_or_default()),
            application_ids: application_ids(self.applications.unwrap_or_default()),
        })
    }

    pub(crate) fn into_update(self) -> RoleUpdate {
        RoleUpdate {
            name: self.name,
            permission_ids: self.permissions.map(permission_ids),
            application_ids: self.applications.map(application_ids),
        }
    }
}

/// Permission fields. An explicit `null` scope clears it on update.
#[derive(Debug, Default, InputObject)]
pub struct PermissionInput {
    pub name: Option<String>,
    pub scope_id: MaybeUndefined<Uuid>,
}

impl PermissionInput {
    pub(crate) fn into_draft(self) -> AppResult<PermissionDraft> {
        Ok(PermissionDraft {
            name: required(self.name, "permission name")?,
            scope: self.scope_id.take().map(ApplicationId::from_uuid),
        })
    }

    pub(crate) fn into_update(self) -> PermissionUpdate {
        let scope = match self.scope_id {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(scope_id) => Some(Some(ApplicationId::from_uuid(scope_id))),
        };

        PermissionUpdate {
            name: self.name,
            scope,
        }
    }
}

/// Fine-grained policy fields.
#[derive(Debug, Default, InputObject)]
pub struct PermissionPolicyInput {
    pub name: Option<String>,
    /// Resource pattern, `*` or `prefix:*` for wildcards.
    pub resource: Option<String>,
    pub verbs: Option<Vec<String>>,
    /// `allow` or `deny`.
    pub effect: Option<String>,
    /// Opaque conditions, stored verbatim.
    pub conditions: Option<Json<Value>>,
}

impl PermissionPolicyInput {
    pub(crate) fn into_draft(self) -> AppResult<PolicyDraft> {
        Ok(PolicyDraft {
            name: required(self.name, "policy name")?,
            resource: required(self.resource, "policy resource")?,
            verbs: self.verbs.unwrap_or_default(),
            effect: required(self.effect, "policy effect")?.parse::<PolicyEffect>()?,
            conditions: self
                .conditions
                .map(|conditions| conditions.0)
                .unwrap_or_else(|| Value::Object(Default::default())),
        })
    }

    pub(crate) fn into_update(self) -> AppResult<PolicyUpdate> {
        Ok(PolicyUpdate {
            name: self.name,
            resource: self.resource,
            verbs: self.verbs,
            effect: self
                .effect
                .map(|effect| effect.parse::<PolicyEffect>())
                .transpose()?,
            conditions: self.conditions.map(|conditions| conditions.0),
        })
    }
}

/// API key fields. `name` is required on creation.
#[derive(Debug, Default, InputObject)]
#[graphql(name = "APIKeyInput")]
pub struct ApiKeyInput {
    pub name: Option<String>,
    /// Role ids the key acts with.
    pub roles: Option<Vec<Uuid>>,
}

impl ApiKeyInput {
    pub(crate) fn into_parts(self) -> AppResult<(String, Vec<RoleId>)> {
        Ok((
            required(self.name, "API key name")?,
            role_ids(self.roles.unwrap_or_default()),
        ))
    }

    pub(crate) fn into_update(self) -> ApiKeyUpdate {
        ApiKeyUpdate {
            name: self.name,
            role_ids: self.roles.map(role_ids),
        }
    }
}

fn required(value: Option<String>, label: &str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation(format!("{label} is required")))
}

pub(crate) fn role_ids(ids: Vec<Uuid>) -> Vec<RoleId> {
    ids.into_iter().map(RoleId::from_uuid).collect()
}

pub(crate) fn permission_ids(ids: Vec<Uuid>) -> Vec<PermissionId> {
    ids.into_iter().map(PermissionId::from_uuid).collect()
}

pub(crate) fn application_ids(ids: Vec<Uuid>) -> Vec<ApplicationId> {
    ids.into_iter().map(ApplicationId::from_uuid).collect()
}

#[cfg(test)]
mod tests {
    use async_graphql::MaybeUndefined;
    use trustgate_core::AppError;
    use uuid::Uuid;

    use super::{PermissionInput, PermissionPolicyInput, RoleInput};

    #[test]
    fn explicit_null_scope_clears_it() {
        let update = PermissionInput {
            name: None,
            scope_id: MaybeUndefined::Null,
        }
        .into_update();
        assert_eq!(update.scope, Some(None));

        let untouched = PermissionInput::default().into_update();
        assert_eq!(untouched.scope, None);
    }

    #[test]
    fn role_creation_requires_a_name() {
        let draft = RoleInput {
            name: None,
            permissions: Some(vec![Uuid::new_v4()]),
            applications: None,
        }
        .into_draft();
        assert!(matches!(draft, Err(AppError::Validation(_))));
    }

    #[test]
    fn policy_effect_is_parsed() {
        let draft = PermissionPolicyInput {
            name: Some("read projects".to_owned()),
            resource: Some("projects:*".to_owned()),
            verbs: Some(vec!["read".to_owned()]),
            effect: Some("sometimes".to_owned()),
            conditions: None,
        }
        .into_draft();
        assert!(matches!(draft, Err(AppError::Validation(_))));
    }
}
