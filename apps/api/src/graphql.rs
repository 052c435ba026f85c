//! GraphQL schema served at `POST /graphql`.
//!
//! Every request carries the [`CallerIdentity`] resolved by the HTTP layer;
//! resolvers pass it explicitly to the application services.

mod errors;
mod inputs;
mod mutation;
mod query;
mod types;

#[cfg(test)]
mod tests;

use async_graphql::{Context, EmptySubscription, Result as GraphQLResult, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::Extension;
use tower_sessions::Session;
use trustgate_core::{AppError, CallerIdentity};

use crate::state::AppState;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use errors::graphql_error;

/// Executable Trustgate schema.
pub type TrustgateSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> TrustgateSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

pub async fn graphql_handler(
    Extension(schema): Extension<TrustgateSchema>,
    Extension(identity): Extension<CallerIdentity>,
    session: Session,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema
        .execute(request.into_inner().data(identity).data(session))
        .await
        .into()
}

/// Returns the identity attached to the current request.
pub(crate) fn require_caller<'ctx>(ctx: &Context<'ctx>) -> GraphQLResult<&'ctx CallerIdentity> {
    ctx.data_opt::<CallerIdentity>().ok_or_else(|| {
        graphql_error(AppError::Unauthorized(
            "authentication required".to_owned(),
        ))
    })
}
