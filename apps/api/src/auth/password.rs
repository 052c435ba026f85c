use axum::Json;
use axum::extract::State;
use tower_sessions::Session;
use tracing::info;
use trustgate_application::LoginOutcome;
use trustgate_core::AppError;

use crate::dto::{AuthLoginRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::store_identity;

/// POST /auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let identity = match state
        .user_service
        .login(&payload.email, &payload.password)
        .await?
    {
        LoginOutcome::Authenticated(identity) => identity,
        // Same response for every failure to prevent account enumeration.
        LoginOutcome::Failed => {
            return Err(AppError::Unauthorized("invalid email or password".to_owned()).into());
        }
    };

    let profile = state
        .authorization_service
        .current_profile(&identity)
        .await?;
    store_identity(&session, &profile.identity).await?;

    info!(
        user_id = %identity.user_id(),
        organisation_id = %identity.organisation_id(),
        "session established"
    );

    Ok(Json(SessionResponse::from(profile)))
}
