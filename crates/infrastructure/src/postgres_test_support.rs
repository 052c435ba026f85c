//! Connection helpers for PostgreSQL-backed repository tests.
//!
//! Tests return early when `DATABASE_URL` is unset.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use trustgate_core::{OrganisationId, UserId};
use trustgate_domain::EmailAddress;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres repository tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn insert_organisation(pool: &PgPool, name: &str) -> OrganisationId {
    let organisation_id = OrganisationId::new();
    let insert = sqlx::query("INSERT INTO organisations (id, name) VALUES ($1, $2)")
        .bind(organisation_id.as_uuid())
        .bind(name)
        .execute(pool)
        .await;

    assert!(insert.is_ok());
    organisation_id
}

pub(crate) async fn insert_user(pool: &PgPool, name: &str) -> UserId {
    let user_id = UserId::new();
    let email = format!("{}@trustgate.test", user_id.as_uuid().simple());
    let insert = sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
        .bind(user_id.as_uuid())
        .bind(name)
        .bind(email)
        .execute(pool)
        .await;

    assert!(insert.is_ok());
    user_id
}

pub(crate) fn unique_email(label: &str) -> EmailAddress {
    EmailAddress::new(format!("{label}.{}@trustgate.test", UserId::new().as_uuid().simple()))
        .unwrap_or_else(|_| unreachable!())
}
