//! Checks that referenced ids belong to the caller's organisation.

use std::collections::BTreeSet;

use trustgate_core::{AppError, AppResult, OrganisationId};
use trustgate_domain::{ApplicationId, PermissionId, RoleId};

use crate::{AccessControlRepository, ApplicationRepository};

pub(crate) async fn ensure_roles_owned(
    repository: &dyn AccessControlRepository,
    organisation_id: OrganisationId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    if role_ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<RoleId> = repository
        .list_roles(organisation_id, Some(role_ids))
        .await?
        .into_iter()
        .map(|role| role.id)
        .collect();

    match role_ids.iter().find(|role_id| !found.contains(role_id)) {
        Some(missing) => Err(AppError::NotFound(format!(
            "role '{missing}' does not exist in organisation '{organisation_id}'"
        ))),
        None => Ok(()),
    }
}

pub(crate) async fn ensure_permissions_owned(
    repository: &dyn AccessControlRepository,
    organisation_id: OrganisationId,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    if permission_ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<PermissionId> = repository
        .list_permissions(organisation_id, Some(permission_ids))
        .await?
        .into_iter()
        .map(|permission| permission.id)
        .collect();

    match permission_ids
        .iter()
        .find(|permission_id| !found.contains(permission_id))
    {
        Some(missing) => Err(AppError::NotFound(format!(
            "permission '{missing}' does not exist in organisation '{organisation_id}'"
        ))),
        None => Ok(()),
    }
}

pub(crate) async fn ensure_applications_exist(
    repository: &dyn ApplicationRepository,
    application_ids: &[ApplicationId],
) -> AppResult<()> {
    if application_ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<ApplicationId> = repository
        .list_applications(Some(application_ids))
        .await?
        .into_iter()
        .map(|application| application.id)
        .collect();

    match application_ids
        .iter()
        .find(|application_id| !found.contains(application_id))
    {
        Some(missing) => Err(AppError::NotFound(format!(
            "application '{missing}' does not exist"
        ))),
        None => Ok(()),
    }
}

/// Sorts and removes duplicate ids.
pub(crate) fn dedup_ids<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    ids.iter()
        .copied()
        .collect::<BTreeSet<T>>()
        .into_iter()
        .collect()
}
