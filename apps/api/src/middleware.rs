use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use trustgate_core::{AppError, CallerIdentity};

use crate::auth::{API_KEY_HEADER, SESSION_IDENTITY_KEY};
use crate::error::ApiResult;
use crate::state::AppState;

const BOOTSTRAP_TOKEN_HEADER: &str = "x-bootstrap-token";

/// Resolves the session identity and attaches it to the request.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<CallerIdentity>(SESSION_IDENTITY_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Resolves an `x-api-key` header to its principal and attaches it to the request.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let secret = api_key_from_headers(request.headers())
        .ok_or_else(|| AppError::Unauthorized("missing API key".to_owned()))?;
    let principal = state.api_key_service.authenticate_api_key(&secret).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Admits operator requests carrying the configured bootstrap token.
pub async fn require_bootstrap_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(BOOTSTRAP_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if token.is_empty() || token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_origin.as_str();
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn api_key_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, Method};

    use super::{api_key_from_headers, is_state_changing_method};

    #[test]
    fn blank_api_key_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("   "));
        assert_eq!(api_key_from_headers(&headers), None);

        headers.insert("x-api-key", HeaderValue::from_static(" tg_secret "));
        assert_eq!(api_key_from_headers(&headers).as_deref(), Some("tg_secret"));
    }

    #[test]
    fn only_writes_are_origin_checked() {
        assert!(is_state_changing_method(&Method::POST));
        assert!(!is_state_changing_method(&Method::GET));
    }
}
