//! Effective access resolution for one (user, organisation) pair.
//!
//! The closure is recomputed from stored state on every check:
//! roles come from the trust, permissions are the union of direct and
//! role-derived grants, and applications are the union of role applications
//! and permission scopes.

use std::collections::BTreeSet;

use serde::Serialize;
use trustgate_core::OrganisationId;

use crate::{
    ApiKey, Application, ApplicationId, Permission, PermissionId, PermissionPolicy, PolicyEffect,
    Role, RoleId, Trust,
};

/// Outcome of evaluating policies for one resource and verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    /// At least one matching allow policy and no matching deny.
    Allow,
    /// A matching deny policy exists.
    Deny,
    /// No policy matched.
    NotApplicable,
}

/// Resolved grants of a user inside one organisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectiveAccess {
    role_ids: BTreeSet<RoleId>,
    permission_ids: BTreeSet<PermissionId>,
    application_ids: BTreeSet<ApplicationId>,
    policies: Vec<PermissionPolicy>,
}

impl EffectiveAccess {
    /// Access of a user without any usable trust.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolves the access closure for a trust.
    ///
    /// `roles` and `permissions` are catalogues of the trust's organisation;
    /// entries of other organisations and roles the trust does not hold are
    /// ignored. Inactive or pending trusts grant nothing.
    #[must_use]
    pub fn resolve(trust: &Trust, roles: &[Role], permissions: &[Permission]) -> Self {
        if !trust.grants_access() {
            return Self::none();
        }

        Self::collect(
            trust.organisation_id,
            &trust.role_ids,
            &trust.permission_ids,
            roles,
            permissions,
        )
    }

    /// Resolves the access closure of an API key from its roles alone.
    #[must_use]
    pub fn for_api_key(api_key: &ApiKey, roles: &[Role], permissions: &[Permission]) -> Self {
        Self::collect(
            api_key.organisation_id,
            &api_key.role_ids,
            &[],
            roles,
            permissions,
        )
    }

    fn collect(
        organisation_id: OrganisationId,
        held_role_ids: &[RoleId],
        direct_permission_ids: &[PermissionId],
        roles: &[Role],
        permissions: &[Permission],
    ) -> Self {
        let role_ids: BTreeSet<RoleId> = held_role_ids.iter().copied().collect();
        let held_roles: Vec<&Role> = roles
            .iter()
            .filter(|role| role.organisation_id == organisation_id && role_ids.contains(&role.id))
            .collect();

        let permission_ids: BTreeSet<PermissionId> = direct_permission_ids
            .iter()
            .copied()
            .chain(
                held_roles
                    .iter()
                    .flat_map(|role| role.permission_ids.iter().copied()),
            )
            .collect();

        let held_permissions: Vec<&Permission> = permissions
            .iter()
            .filter(|permission| {
                permission.organisation_id == organisation_id
                    && permission_ids.contains(&permission.id)
            })
            .collect();

        let application_ids: BTreeSet<ApplicationId> = held_roles
            .iter()
            .flat_map(|role| role.application_ids.iter().copied())
            .chain(
                held_permissions
                    .iter()
                    .filter_map(|permission| permission.scope),
            )
            .collect();

        let policies = held_permissions
            .iter()
            .flat_map(|permission| permission.policies.iter().cloned())
            .collect();

        Self {
            role_ids,
            permission_ids,
            application_ids,
            policies,
        }
    }

    /// Returns the effective roles.
    #[must_use]
    pub fn role_ids(&self) -> &BTreeSet<RoleId> {
        &self.role_ids
    }

    /// Returns the effective permissions, direct and role-derived.
    #[must_use]
    pub fn permission_ids(&self) -> &BTreeSet<PermissionId> {
        &self.permission_ids
    }

    /// Returns every application reachable through roles or permission scopes.
    #[must_use]
    pub fn application_ids(&self) -> &BTreeSet<ApplicationId> {
        &self.application_ids
    }

    /// Returns whether the access closure grants anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.role_ids.is_empty() && self.permission_ids.is_empty()
    }

    /// Keeps only installed applications that are also reachable.
    #[must_use]
    pub fn filter_installed(&self, installed: Vec<Application>) -> Vec<Application> {
        installed
            .into_iter()
            .filter(|application| self.application_ids.contains(&application.id))
            .collect()
    }

    /// Evaluates attached policies; deny wins over allow.
    #[must_use]
    pub fn evaluate(&self, resource: &str, verb: &str) -> PolicyDecision {
        let mut decision = PolicyDecision::NotApplicable;

        for policy in self
            .policies
            .iter()
            .filter(|policy| policy.matches(resource, verb))
        {
            match policy.effect {
                PolicyEffect::Deny => return PolicyDecision::Deny,
                PolicyEffect::Allow => decision = PolicyDecision::Allow,
            }
        }

        decision
    }

    /// Returns whether policies allow the verb on the resource.
    #[must_use]
    pub fn is_allowed(&self, resource: &str, verb: &str) -> bool {
        self.evaluate(resource, verb) == PolicyDecision::Allow
    }
}
