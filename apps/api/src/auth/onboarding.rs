use axum::Json;
use axum::extract::State;
use tower_sessions::Session;
use trustgate_application::OnboardingRedemption;

use crate::dto::{AuthOnboardingRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::store_identity;

/// POST /auth/onboarding - Redeem an invitation link and sign in.
pub async fn onboarding_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthOnboardingRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let identity = state
        .user_service
        .complete_onboarding(OnboardingRedemption {
            token: payload.token,
            password: payload.password,
            name: payload.name,
        })
        .await?;

    let profile = state
        .authorization_service
        .current_profile(&identity)
        .await?;
    store_identity(&session, &profile.identity).await?;

    Ok(Json(SessionResponse::from(profile)))
}
