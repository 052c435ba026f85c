mod cors;
mod machine;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use trustgate_core::AppError;

use crate::graphql::{build_schema, graphql_handler};
use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub fn build_router(
    app_state: AppState,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(&app_state.frontend_origin)?;
    let schema = build_schema(app_state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/graphql", post(graphql_handler))
        .route_layer(from_fn(middleware::require_auth))
        .layer(Extension(schema));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/onboarding", post(auth::onboarding_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .merge(machine::build_api_key_routes(app_state.clone()))
        .merge(machine::build_admin_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
