use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

/// Routes authenticated with an organisation API key.
pub(super) fn build_api_key_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/api-key", get(auth::api_key_principal_handler))
        .route_layer(from_fn_with_state(app_state, middleware::require_api_key))
        .route("/auth/api-keys/verify", post(auth::verify_api_key_handler))
}

/// Operator routes guarded by the bootstrap token.
pub(super) fn build_admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/organisations",
            post(handlers::admin::bootstrap_organisation_handler),
        )
        .route(
            "/admin/applications",
            get(handlers::admin::list_applications_handler)
                .post(handlers::admin::register_application_handler),
        )
        .route(
            "/admin/applications/{application_id}",
            put(handlers::admin::update_application_handler)
                .delete(handlers::admin::delete_application_handler),
        )
        .route(
            "/admin/applications/by-slug/{slug}",
            get(handlers::admin::application_by_slug_handler),
        )
        .route(
            "/admin/applications/by-public-key/{public_key}",
            get(handlers::admin::application_by_public_key_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_bootstrap_token,
        ))
}
