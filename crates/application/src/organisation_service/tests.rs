use std::sync::Arc;

use trustgate_core::{AppError, CallerIdentity};
use trustgate_domain::{ApplicationId, AuditAction, DEFAULT_ROLE_NAME};

use crate::test_support::{FakePasswordHasher, Fixture};
use crate::{
    OrganisationBootstrap, OrganisationRepository, OrganisationService, TrustRepository,
};

fn service(fixture: &Fixture) -> OrganisationService {
    OrganisationService::new(
        fixture.authorization_service(),
        fixture.store.clone(),
        fixture.store.clone(),
        fixture.store.clone(),
        fixture.store.clone(),
        fixture.store.clone(),
        Arc::new(FakePasswordHasher),
    )
}

fn bootstrap(email: &str) -> OrganisationBootstrap {
    OrganisationBootstrap {
        name: "Globex".to_owned(),
        owner_email: email.to_owned(),
        owner_name: Some("Hank".to_owned()),
        owner_password: Some("correct-horse-battery".to_owned()),
    }
}

#[tokio::test]
async fn bootstrap_seeds_admin_role_and_active_owner_trust() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let created = service
        .bootstrap_organisation(bootstrap("hank@globex.test"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.admin_role.name, DEFAULT_ROLE_NAME);
    assert_eq!(created.owner.name.as_deref(), Some("Hank"));
    let trust = fixture
        .store
        .find_trust(created.owner.id, created.organisation.id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert!(trust.grants_access());
    assert_eq!(trust.role_ids, vec![created.admin_role.id]);
    assert_eq!(
        fixture
            .store
            .state
            .lock()
            .await
            .password_hashes
            .get(&created.owner.id)
            .cloned(),
        Some("hashed:correct-horse-battery".to_owned())
    );
}

#[tokio::test]
async fn bootstrap_reuses_existing_owner_account() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let created = service
        .bootstrap_organisation(OrganisationBootstrap {
            owner_password: None,
            ..bootstrap("admin@acme.test")
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.owner.id, fixture.admin.id);
    assert_eq!(
        fixture
            .store
            .list_trusts_for_user(fixture.admin.id)
            .await
            .unwrap_or_default()
            .len(),
        2
    );
}

#[tokio::test]
async fn bootstrap_rejects_weak_password() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let result = service
        .bootstrap_organisation(OrganisationBootstrap {
            owner_password: Some("short".to_owned()),
            ..bootstrap("weak@globex.test")
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn rename_requires_non_blank_name() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    assert!(matches!(
        service.rename_organisation(&fixture.caller, "  ").await,
        Err(AppError::Validation(_))
    ));
    let renamed = service
        .rename_organisation(&fixture.caller, "Acme Corp")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(renamed.name, "Acme Corp");
    assert_eq!(
        fixture.store.audit_actions().await,
        vec![AuditAction::OrganisationRenamed]
    );
}

#[tokio::test]
async fn install_and_uninstall_application() {
    let fixture = Fixture::new().await;
    let application = fixture.store.add_application("crm", None).await;
    let service = service(&fixture);

    assert!(
        service
            .install_application(&fixture.caller, application.id)
            .await
            .is_ok()
    );
    assert_eq!(
        fixture
            .store
            .list_installed_applications(fixture.organisation.id)
            .await
            .unwrap_or_default(),
        vec![application.clone()]
    );

    assert!(
        service
            .uninstall_application(&fixture.caller, application.id)
            .await
            .is_ok()
    );
    assert!(
        fixture
            .store
            .list_installed_applications(fixture.organisation.id)
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn installing_unknown_application_is_not_found() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let result = service
        .install_application(&fixture.caller, ApplicationId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn non_members_cannot_rename() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);
    let stranger = CallerIdentity::new(
        fixture.store.add_user("x@acme.test", None).await.id,
        "x",
        None,
        fixture.organisation.id,
    );

    assert!(matches!(
        service.rename_organisation(&stranger, "Hijacked").await,
        Err(AppError::Forbidden(_))
    ));
}
