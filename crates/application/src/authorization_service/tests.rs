use serde_json::json;
use trustgate_core::{AppError, CallerIdentity};
use trustgate_domain::{PolicyDecision, PolicyEffect};

use crate::test_support::Fixture;
use crate::{AccessControlRepository, PermissionDraft, PolicyDraft, RoleDraft, UserRepository};

#[tokio::test]
async fn effective_access_merges_role_and_direct_permissions() {
    let fixture = Fixture::new().await;
    let organisation_id = fixture.organisation.id;
    let scoped_app = fixture.store.add_application("timesheets", Some(organisation_id)).await;
    let role_app = fixture.store.add_application("crm", None).await;
    let direct = fixture
        .store
        .create_permission(
            organisation_id,
            PermissionDraft {
                name: "direct".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let scoped = fixture
        .store
        .create_permission(
            organisation_id,
            PermissionDraft {
                name: "scoped".to_owned(),
                scope: Some(scoped_app.id),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let role = fixture
        .store
        .create_role(
            organisation_id,
            RoleDraft {
                name: "Crew".to_owned(),
                permission_ids: vec![scoped.id, direct.id],
                application_ids: vec![role_app.id],
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let member = fixture.store.add_user("crew@acme.test", None).await;
    fixture
        .store
        .add_trust(member.id, organisation_id, vec![role.id], vec![direct.id], true)
        .await;
    let service = fixture.authorization_service();

    let access = service
        .effective_access(member.id, organisation_id)
        .await
        .unwrap_or_default();

    assert_eq!(access.permission_ids().len(), 2);
    assert!(access.application_ids().contains(&scoped_app.id));
    assert!(access.application_ids().contains(&role_app.id));

    let caller = CallerIdentity::new(member.id, "crew", None, organisation_id);
    let visible = service
        .accessible_applications(&caller)
        .await
        .unwrap_or_default();
    assert_eq!(visible, vec![scoped_app]);
}

#[tokio::test]
async fn pending_trust_grants_nothing() {
    let fixture = Fixture::new().await;
    let pending = fixture.store.add_user("pending@acme.test", None).await;
    let permission = fixture
        .store
        .create_permission(
            fixture.organisation.id,
            PermissionDraft {
                name: "direct".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    fixture
        .store
        .add_trust(
            pending.id,
            fixture.organisation.id,
            Vec::new(),
            vec![permission.id],
            false,
        )
        .await;
    let service = fixture.authorization_service();

    let access = service
        .effective_access(pending.id, fixture.organisation.id)
        .await
        .unwrap_or_default();
    assert!(access.is_empty());

    let caller = CallerIdentity::new(pending.id, "pending", None, fixture.organisation.id);
    assert!(matches!(
        service.require_member(&caller).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn check_access_applies_deny_over_allow() {
    let fixture = Fixture::new().await;
    let organisation_id = fixture.organisation.id;
    let permission = fixture
        .store
        .create_permission(
            organisation_id,
            PermissionDraft {
                name: "projects".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    for (resource, effect) in [
        ("projects:*", PolicyEffect::Allow),
        ("projects:secret", PolicyEffect::Deny),
    ] {
        let created = fixture
            .store
            .create_policy(
                organisation_id,
                permission.id,
                PolicyDraft {
                    name: resource.to_owned(),
                    resource: resource.to_owned(),
                    verbs: vec!["read".to_owned()],
                    effect,
                    conditions: json!({}),
                },
            )
            .await;
        assert!(created.is_ok());
    }
    let member = fixture.store.add_user("reader@acme.test", None).await;
    fixture
        .store
        .add_trust(member.id, organisation_id, Vec::new(), vec![permission.id], true)
        .await;
    let caller = CallerIdentity::new(member.id, "reader", None, organisation_id);
    let service = fixture.authorization_service();

    assert_eq!(
        service.check_access(&caller, "projects:1", "read").await.ok(),
        Some(PolicyDecision::Allow)
    );
    assert_eq!(
        service.check_access(&caller, "projects:secret", "read").await.ok(),
        Some(PolicyDecision::Deny)
    );
    assert_eq!(
        service.check_access(&caller, "projects:1", "write").await.ok(),
        Some(PolicyDecision::NotApplicable)
    );
}

#[tokio::test]
async fn switch_organisation_persists_and_returns_profile() {
    let fixture = Fixture::new().await;
    let second = fixture.store.add_organisation("Second").await;
    fixture
        .store
        .add_trust(fixture.admin.id, second.id, Vec::new(), Vec::new(), true)
        .await;
    let service = fixture.authorization_service();

    let profile = service
        .switch_organisation(&fixture.caller, second.id)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(profile.organisation, second);
    assert_eq!(profile.identity.organisation_id(), second.id);
    assert_eq!(profile.organisations.len(), 2);
    let stored = fixture
        .store
        .find_user(fixture.admin.id)
        .await
        .unwrap_or_default()
        .and_then(|user| user.last_organisation);
    assert_eq!(stored, Some(second.id));
}

#[tokio::test]
async fn switch_to_untrusted_organisation_changes_nothing() {
    let fixture = Fixture::new().await;
    let foreign = fixture.store.add_organisation("Foreign").await;
    let service = fixture.authorization_service();

    let result = service.switch_organisation(&fixture.caller, foreign.id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    let stored = fixture
        .store
        .find_user(fixture.admin.id)
        .await
        .unwrap_or_default()
        .and_then(|user| user.last_organisation);
    assert_eq!(stored, None);
}

#[tokio::test]
async fn switch_to_deactivated_trust_is_rejected() {
    let fixture = Fixture::new().await;
    let second = fixture.store.add_organisation("Second").await;
    fixture
        .store
        .add_trust(fixture.admin.id, second.id, Vec::new(), Vec::new(), true)
        .await;
    for trust in &mut fixture.store.state.lock().await.trusts {
        if trust.organisation_id == second.id {
            trust.inactive = true;
        }
    }
    let service = fixture.authorization_service();

    let result = service.switch_organisation(&fixture.caller, second.id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
