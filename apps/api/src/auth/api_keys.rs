use axum::Json;
use axum::extract::{Extension, State};
use trustgate_application::ApiKeyPrincipal;

use crate::dto::{ApiKeyPrincipalResponse, ApiKeyVerifyRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /auth/api-key - Describes the key presented in `x-api-key`.
pub async fn api_key_principal_handler(
    Extension(principal): Extension<ApiKeyPrincipal>,
) -> Json<ApiKeyPrincipalResponse> {
    Json(ApiKeyPrincipalResponse::from(principal))
}

/// POST /auth/api-keys/verify - Resolves a key forwarded by an application backend.
pub async fn verify_api_key_handler(
    State(state): State<AppState>,
    Json(payload): Json<ApiKeyVerifyRequest>,
) -> ApiResult<Json<ApiKeyPrincipalResponse>> {
    let principal = state
        .api_key_service
        .authenticate_api_key(&payload.key)
        .await?;

    Ok(Json(ApiKeyPrincipalResponse::from(principal)))
}
