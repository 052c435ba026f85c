//! Session-based authentication endpoints.

mod api_keys;
mod onboarding;
mod password;
mod session;

use tower_sessions::Session;
use trustgate_application::SessionProfile;
use trustgate_core::{AppError, AppResult, CallerIdentity};

pub use api_keys::{api_key_principal_handler, verify_api_key_handler};
pub use onboarding::onboarding_handler;
pub use password::login_handler;
pub use session::{logout_handler, me_handler};

/// Session key holding the serialized [`CallerIdentity`].
pub const SESSION_IDENTITY_KEY: &str = "trustgate.identity";

/// Header carrying an organisation API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rotates the session id and stores the identity of the signed-in user.
pub(crate) async fn store_identity(session: &Session, identity: &CallerIdentity) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_IDENTITY_KEY, identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session identity: {error}")))
}

/// Replaces the stored identity after an organisation switch.
pub(crate) async fn replace_identity(
    session: &Session,
    profile: &SessionProfile,
) -> AppResult<()> {
    session
        .insert(SESSION_IDENTITY_KEY, &profile.identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session identity: {error}")))
}
