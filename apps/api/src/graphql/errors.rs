use async_graphql::{Error, ErrorExtensions};
use tracing::error;
use trustgate_core::AppError;

/// Stable `extensions.code` value for an application error.
pub(crate) fn error_code(error: &AppError) -> &'static str {
    match error {
        AppError::Validation(_) => "BAD_USER_INPUT",
        AppError::NotFound(_) => "NOT_FOUND",
        AppError::Conflict(_) => "CONFLICT",
        AppError::Unauthorized(_) => "UNAUTHENTICATED",
        AppError::Forbidden(_) => "FORBIDDEN",
        AppError::Transport(_) => "TRANSPORT_ERROR",
        AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
    }
}

/// Converts an application error into a GraphQL error carrying its code.
pub(crate) fn graphql_error(app_error: AppError) -> Error {
    let code = error_code(&app_error);
    let message = match &app_error {
        AppError::Internal(detail) => {
            error!(error = %detail, "graphql resolver failed");
            "internal server error".to_owned()
        }
        AppError::Validation(message)
        | AppError::NotFound(message)
        | AppError::Conflict(message)
        | AppError::Unauthorized(message)
        | AppError::Forbidden(message)
        | AppError::Transport(message) => message.clone(),
    };

    Error::new(message).extend_with(|_, extensions| extensions.set("code", code))
}
