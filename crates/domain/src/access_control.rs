use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trustgate_core::{AppError, AppResult, NonEmptyString, OrganisationId};

use crate::{ApiKeyId, ApplicationId, PermissionId, PolicyId, RoleId};

/// Named bundle of permissions and applications inside one organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Owning organisation.
    pub organisation_id: OrganisationId,
    /// Role name.
    pub name: String,
    /// Permissions of the same organisation attached to the role.
    pub permission_ids: Vec<PermissionId>,
    /// Applications the role opens up.
    pub application_ids: Vec<ApplicationId>,
}

/// Organisation permission, optionally scoped to one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Owning organisation.
    pub organisation_id: OrganisationId,
    /// Permission name.
    pub name: String,
    /// Application the permission applies to.
    pub scope: Option<ApplicationId>,
    /// Fine-grained policies attached to the permission.
    pub policies: Vec<PermissionPolicy>,
}

/// Fine-grained rule attached to a permission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    /// Stable policy identifier.
    pub id: PolicyId,
    /// Owning permission.
    pub permission_id: PermissionId,
    /// Policy name.
    pub name: String,
    /// Resource pattern. `*` matches everything, `prefix:*` matches a namespace.
    pub resource: String,
    /// Lowercased verbs. `*` matches every verb.
    pub verbs: Vec<String>,
    /// Allow or deny.
    pub effect: PolicyEffect,
    /// Opaque structured conditions, stored and returned verbatim.
    pub conditions: Value,
}

impl PermissionPolicy {
    /// Returns whether the policy applies to the resource and verb.
    #[must_use]
    pub fn matches(&self, resource: &str, verb: &str) -> bool {
        let resource_matches = match self.resource.strip_suffix('*') {
            Some(prefix) => resource.starts_with(prefix),
            None => self.resource == resource,
        };

        resource_matches
            && self
                .verbs
                .iter()
                .any(|candidate| candidate == "*" || candidate.eq_ignore_ascii_case(verb))
    }
}

/// Closed set of policy effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyEffect {
    /// Grants the matched verbs.
    Allow,
    /// Revokes the matched verbs, overriding any allow.
    Deny,
}

impl PolicyEffect {
    /// Returns a stable storage value for this effect.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl FromStr for PolicyEffect {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            _ => Err(AppError::Validation(format!(
                "policy effect must be 'allow' or 'deny', got '{value}'"
            ))),
        }
    }
}

/// Organisation API key. Only a digest of the secret is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Stable key identifier.
    pub id: ApiKeyId,
    /// Owning organisation.
    pub organisation_id: OrganisationId,
    /// Key label.
    pub name: String,
    /// Roles the key acts with.
    pub role_ids: Vec<RoleId>,
}

/// Trims a required name, rejecting blank values.
pub fn normalize_name(value: &str, label: &str) -> AppResult<String> {
    NonEmptyString::new(value.trim())
        .map(String::from)
        .map_err(|_| AppError::Validation(format!("{label} name must not be empty")))
}

/// Lowercases, trims and de-duplicates policy verbs, preserving first-seen order.
pub fn normalize_verbs(verbs: &[String]) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(verbs.len());

    for verb in verbs {
        let verb = verb.trim().to_ascii_lowercase();
        if verb.is_empty() {
            return Err(AppError::Validation(
                "policy verbs must not be empty".to_owned(),
            ));
        }
        if !normalized.contains(&verb) {
            normalized.push(verb);
        }
    }

    if normalized.is_empty() {
        return Err(AppError::Validation(
            "policy must declare at least one verb".to_owned(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn policy(resource: &str, verbs: &[&str], effect: PolicyEffect) -> PermissionPolicy {
        PermissionPolicy {
            id: PolicyId::new(),
            permission_id: PermissionId::new(),
            name: "test".to_owned(),
            resource: resource.to_owned(),
            verbs: verbs.iter().map(|verb| (*verb).to_owned()).collect(),
            effect,
            conditions: json!({}),
        }
    }

    #[test]
    fn effect_parses_case_insensitively() {
        assert_eq!(PolicyEffect::from_str("Deny").ok(), Some(PolicyEffect::Deny));
        assert!(PolicyEffect::from_str("maybe").is_err());
    }

    #[test]
    fn namespace_wildcard_matches_nested_resources() {
        let rule = policy("projects:*", &["read"], PolicyEffect::Allow);
        assert!(rule.matches("projects:42", "READ"));
        assert!(!rule.matches("timesheets:1", "read"));
        assert!(!rule.matches("projects:42", "write"));
    }

    #[test]
    fn verb_wildcard_matches_any_verb() {
        let rule = policy("invoices", &["*"], PolicyEffect::Allow);
        assert!(rule.matches("invoices", "delete"));
        assert!(!rule.matches("invoices:1", "delete"));
    }

    #[test]
    fn verbs_are_normalized_and_deduplicated() {
        let verbs = normalize_verbs(&[" Read ".to_owned(), "read".to_owned(), "write".to_owned()]);
        assert_eq!(
            verbs.unwrap_or_default(),
            vec!["read".to_owned(), "write".to_owned()]
        );
    }

    #[test]
    fn empty_verb_list_is_rejected() {
        assert!(normalize_verbs(&[]).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            normalize_name("   ", "role"),
            Err(AppError::Validation(message)) if message == "role name must not be empty"
        ));
    }
}
