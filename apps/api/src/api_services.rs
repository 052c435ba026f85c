mod database;
mod email;
mod sessions;
mod state_builder;

pub use database::connect_and_migrate;
pub use sessions::build_postgres_session_layer;
pub use state_builder::{RepositorySet, build_app_state, build_services};
