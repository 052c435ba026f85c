use std::sync::Arc;

use async_graphql::{Request, Response, Value};
use trustgate_application::OrganisationBootstrap;
use trustgate_core::{CallerIdentity, OrganisationId};
use trustgate_infrastructure::{
    Argon2PasswordHasher, InMemoryIdentityStore, JwtOnboardingTokenCodec,
};
use url::Url;

use crate::api_services::{RepositorySet, build_services};

use super::{TrustgateSchema, build_schema};

const TOKEN_SECRET: &str = "graphql-tests-onboarding-secret-0123456789";

async fn schema_with_owner() -> (TrustgateSchema, CallerIdentity) {
    let frontend_url = Url::parse("http://localhost:3000/").unwrap_or_else(|_| unreachable!());
    let token_codec =
        JwtOnboardingTokenCodec::new(TOKEN_SECRET).unwrap_or_else(|_| unreachable!());
    let state = build_services(
        RepositorySet::shared(Arc::new(InMemoryIdentityStore::new())),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(token_codec),
        None,
        &frontend_url,
        "http://localhost:3000".to_owned(),
        "bootstrap-token".to_owned(),
    );

    let bootstrapped = state
        .organisation_service
        .bootstrap_organisation(OrganisationBootstrap {
            name: "Acme".to_owned(),
            owner_email: "owner@acme.test".to_owned(),
            owner_name: Some("Owner".to_owned()),
            owner_password: None,
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let caller = CallerIdentity::new(
        bootstrapped.owner.id,
        bootstrapped.owner.display_name(),
        Some(bootstrapped.owner.email.clone()),
        bootstrapped.organisation.id,
    );

    (build_schema(state), caller)
}

async fn execute_as(schema: &TrustgateSchema, caller: &CallerIdentity, query: &str) -> Response {
    schema
        .execute(Request::new(query).data(caller.clone()))
        .await
}

fn error_code(response: &Response) -> Option<String> {
    response
        .errors
        .first()
        .and_then(|error| error.extensions.as_ref())
        .and_then(|extensions| extensions.get("code"))
        .and_then(|code| match code {
            Value::String(code) => Some(code.clone()),
            _ => None,
        })
}

#[tokio::test]
async fn requests_without_identity_are_unauthenticated() {
    let (schema, _) = schema_with_owner().await;

    let response = schema.execute("{ organisation { id name } }").await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));
}

#[tokio::test]
async fn organisation_query_returns_active_organisation() {
    let (schema, caller) = schema_with_owner().await;

    let response = execute_as(&schema, &caller, "{ organisation { name } }").await;

    assert!(response.errors.is_empty());
    let data = response.data.into_json().unwrap_or_default();
    assert_eq!(data["organisation"]["name"], "Acme");
}

#[tokio::test]
async fn duplicate_invite_is_a_conflict() {
    let (schema, caller) = schema_with_owner().await;
    let mutation = r#"mutation {
        createUserTrust(input: { email: "member@acme.test", name: "Member" }) {
            email
            trust { state accepted }
        }
    }"#;

    let first = execute_as(&schema, &caller, mutation).await;
    assert!(first.errors.is_empty());
    let data = first.data.into_json().unwrap_or_default();
    assert_eq!(data["createUserTrust"]["email"], "member@acme.test");
    assert_eq!(data["createUserTrust"]["trust"]["state"], "pending");

    let second = execute_as(&schema, &caller, mutation).await;
    assert_eq!(error_code(&second).as_deref(), Some("CONFLICT"));
}

#[tokio::test]
async fn updating_unknown_trust_is_not_found() {
    let (schema, caller) = schema_with_owner().await;
    let mutation = format!(
        r#"mutation {{
            updateUserTrust(id: "{}", input: {{ inactive: true }}) {{ id }}
        }}"#,
        uuid::Uuid::new_v4()
    );

    let response = execute_as(&schema, &caller, &mutation).await;

    assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn switching_to_untrusted_organisation_is_rejected() {
    let (schema, caller) = schema_with_owner().await;
    let mutation = format!(
        r#"mutation {{ switchOrganisation(id: "{}") {{ id }} }}"#,
        OrganisationId::new()
    );

    let response = execute_as(&schema, &caller, &mutation).await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn roles_resolve_their_permissions() {
    let (schema, caller) = schema_with_owner().await;

    let created = execute_as(
        &schema,
        &caller,
        r#"mutation { createPermission(input: { name: "reports.read" }) { id name } }"#,
    )
    .await;
    assert!(created.errors.is_empty());
    let permission_id = created.data.into_json().unwrap_or_default()["createPermission"]["id"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default();

    let role = execute_as(
        &schema,
        &caller,
        &format!(
            r#"mutation {{
                createRole(input: {{ name: "Analyst", permissions: ["{permission_id}"] }}) {{
                    name
                    permissions {{ name }}
                }}
            }}"#
        ),
    )
    .await;

    assert!(role.errors.is_empty());
    let data = role.data.into_json().unwrap_or_default();
    assert_eq!(data["createRole"]["name"], "Analyst");
    assert_eq!(data["createRole"]["permissions"][0]["name"], "reports.read");
}

#[tokio::test]
async fn created_api_key_returns_secret_once() {
    let (schema, caller) = schema_with_owner().await;

    let created = execute_as(
        &schema,
        &caller,
        r#"mutation { createAPIKey(input: { name: "CI" }) { key apiKey { name } } }"#,
    )
    .await;
    assert!(created.errors.is_empty());
    let data = created.data.into_json().unwrap_or_default();
    assert!(
        data["createAPIKey"]["key"]
            .as_str()
            .is_some_and(|key| key.starts_with("tg_"))
    );

    let listed = execute_as(&schema, &caller, "{ apiKeys { name } }").await;
    assert!(listed.errors.is_empty());
    let data = listed.data.into_json().unwrap_or_default();
    assert_eq!(data["apiKeys"][0]["name"], "CI");
}

#[tokio::test]
async fn organisation_resolves_its_roles_members_and_keys() {
    let (schema, caller) = schema_with_owner().await;

    let roles = execute_as(&schema, &caller, "{ organisation { roles { id name } } }").await;
    assert!(roles.errors.is_empty());
    let data = roles.data.into_json().unwrap_or_default();
    assert_eq!(data["organisation"]["roles"][0]["name"], "Admin");
    let admin_role_id = data["organisation"]["roles"][0]["id"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default();

    let created = execute_as(
        &schema,
        &caller,
        &format!(
            r#"mutation {{
                createAPIKey(input: {{ name: "Deploy", roles: ["{admin_role_id}"] }}) {{ key }}
            }}"#
        ),
    )
    .await;
    assert!(created.errors.is_empty());

    let response = execute_as(
        &schema,
        &caller,
        r#"{
            organisation {
                name
                members { email }
                apiKeys { name roles { name } }
                applications { slug }
            }
        }"#,
    )
    .await;

    assert!(response.errors.is_empty());
    let data = response.data.into_json().unwrap_or_default();
    let organisation = &data["organisation"];
    assert_eq!(organisation["members"][0]["email"], "owner@acme.test");
    assert_eq!(organisation["apiKeys"][0]["name"], "Deploy");
    assert_eq!(organisation["apiKeys"][0]["roles"][0]["name"], "Admin");
    assert!(
        organisation["applications"]
            .as_array()
            .is_some_and(|applications| applications.is_empty())
    );
}
