use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::info;
use trustgate_core::{AppError, CallerIdentity};

use crate::dto::SessionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_IDENTITY_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let user_id = session
        .get::<CallerIdentity>(SESSION_IDENTITY_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.user_id());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(user_id) = user_id {
        info!(%user_id, "session closed");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> ApiResult<Json<SessionResponse>> {
    let profile = state
        .authorization_service
        .current_profile(&identity)
        .await?;

    Ok(Json(SessionResponse::from(profile)))
}
