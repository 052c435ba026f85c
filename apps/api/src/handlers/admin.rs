//! Operator endpoints guarded by the bootstrap token.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use trustgate_domain::ApplicationId;
use uuid::Uuid;

use crate::dto::{
    ApplicationRequest, ApplicationResponse, BootstrapOrganisationRequest,
    BootstrapOrganisationResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn bootstrap_organisation_handler(
    State(state): State<AppState>,
    Json(payload): Json<BootstrapOrganisationRequest>,
) -> ApiResult<(StatusCode, Json<BootstrapOrganisationResponse>)> {
    let bootstrapped = state
        .organisation_service
        .bootstrap_organisation(payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BootstrapOrganisationResponse::from(bootstrapped)),
    ))
}

pub async fn list_applications_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ApplicationResponse>>> {
    let applications = state
        .application_registry_service
        .list_applications(None)
        .await?;

    Ok(Json(
        applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
    ))
}

pub async fn register_application_handler(
    State(state): State<AppState>,
    Json(payload): Json<ApplicationRequest>,
) -> ApiResult<(StatusCode, Json<ApplicationResponse>)> {
    let application = state
        .application_registry_service
        .register_application(payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

pub async fn update_application_handler(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<ApplicationRequest>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application = state
        .application_registry_service
        .update_application(ApplicationId::from_uuid(application_id), payload.into())
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}

pub async fn delete_application_handler(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application = state
        .application_registry_service
        .delete_application(ApplicationId::from_uuid(application_id))
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}

pub async fn application_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application = state
        .application_registry_service
        .find_by_slug(&slug)
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}

pub async fn application_by_public_key_handler(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application = state
        .application_registry_service
        .find_by_public_key(&public_key)
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}
