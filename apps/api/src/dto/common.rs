use serde::Serialize;
use trustgate_domain::{Organisation, Permission, PermissionPolicy, Role};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Organisation summary.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/organisation-response.ts"
)]
pub struct OrganisationResponse {
    pub id: String,
    pub name: String,
}

impl From<&Organisation> for OrganisationResponse {
    fn from(value: &Organisation) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
        }
    }
}

/// Identifier and name of a role or API key.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/named-resource-response.ts"
)]
pub struct NamedResourceResponse {
    pub id: String,
    pub name: String,
}

impl From<&Role> for NamedResourceResponse {
    fn from(value: &Role) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
        }
    }
}

/// Permission with its policies.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub scope_id: Option<String>,
    pub policies: Vec<PolicyResponse>,
}

/// Policy attached to a permission.
#[derive(Debug, Clone, Serialize, TS)]
pub struct PolicyResponse {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub verbs: Vec<String>,
    pub effect: String,
    #[ts(type = "unknown")]
    pub conditions: serde_json::Value,
}

impl From<&PermissionPolicy> for PolicyResponse {
    fn from(value: &PermissionPolicy) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            resource: value.resource.clone(),
            verbs: value.verbs.clone(),
            effect: value.effect.as_str().to_owned(),
            conditions: value.conditions.clone(),
        }
    }
}

impl From<&Permission> for PermissionResponse {
    fn from(value: &Permission) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            scope_id: value.scope.map(|scope| scope.to_string()),
            policies: value.policies.iter().map(PolicyResponse::from).collect(),
        }
    }
}
