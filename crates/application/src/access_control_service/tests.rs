use serde_json::json;
use trustgate_core::{AppError, CallerIdentity};
use trustgate_domain::{ApplicationId, AuditAction, PolicyEffect, PolicyId};

use crate::test_support::Fixture;
use crate::{
    AccessControlService, PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate, RoleDraft,
    RoleUpdate,
};

fn service(fixture: &Fixture) -> AccessControlService {
    AccessControlService::new(
        fixture.authorization_service(),
        fixture.store.clone(),
        fixture.store.clone(),
        fixture.store.clone(),
    )
}

fn policy_draft(verbs: &[&str]) -> PolicyDraft {
    PolicyDraft {
        name: "read projects".to_owned(),
        resource: " projects:* ".to_owned(),
        verbs: verbs.iter().map(|verb| (*verb).to_owned()).collect(),
        effect: PolicyEffect::Allow,
        conditions: json!({"team": "ops"}),
    }
}

#[tokio::test]
async fn create_role_validates_ownership_of_permissions() {
    let fixture = Fixture::new().await;
    let other = fixture.store.add_organisation("Other").await;
    let outsider = fixture.store.add_user("other@other.test", None).await;
    fixture
        .store
        .add_trust(outsider.id, other.id, Vec::new(), Vec::new(), true)
        .await;
    let other_caller = CallerIdentity::new(outsider.id, "other", None, other.id);
    let service = service(&fixture);
    let foreign = service
        .create_permission(
            &other_caller,
            PermissionDraft {
                name: "foreign".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = service
        .create_role(
            &fixture.caller,
            RoleDraft {
                name: "Crew".to_owned(),
                permission_ids: vec![foreign.id],
                application_ids: Vec::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn role_lifecycle_is_audited() {
    let fixture = Fixture::new().await;
    let application = fixture.store.add_application("crm", None).await;
    let service = service(&fixture);

    let role = service
        .create_role(
            &fixture.caller,
            RoleDraft {
                name: "  Crew ".to_owned(),
                permission_ids: Vec::new(),
                application_ids: vec![application.id, application.id],
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(role.name, "Crew");
    assert_eq!(role.application_ids, vec![application.id]);

    let renamed = service
        .update_role(
            &fixture.caller,
            role.id,
            RoleUpdate {
                name: Some("Deck crew".to_owned()),
                ..RoleUpdate::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(renamed.name, "Deck crew");
    assert_eq!(renamed.application_ids, vec![application.id]);

    assert!(service.delete_role(&fixture.caller, role.id).await.is_ok());
    assert_eq!(
        fixture.store.audit_actions().await,
        vec![
            AuditAction::RoleCreated,
            AuditAction::RoleUpdated,
            AuditAction::RoleDeleted
        ]
    );
}

#[tokio::test]
async fn role_with_unknown_application_is_rejected() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let result = service
        .create_role(
            &fixture.caller,
            RoleDraft {
                name: "Crew".to_owned(),
                permission_ids: Vec::new(),
                application_ids: vec![ApplicationId::new()],
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn blank_permission_name_is_rejected() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);

    let result = service
        .create_permission(
            &fixture.caller,
            PermissionDraft {
                name: "  ".to_owned(),
                scope: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn permission_scope_can_be_cleared() {
    let fixture = Fixture::new().await;
    let application = fixture.store.add_application("crm", None).await;
    let service = service(&fixture);
    let permission = service
        .create_permission(
            &fixture.caller,
            PermissionDraft {
                name: "crm.read".to_owned(),
                scope: Some(application.id),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let cleared = service
        .update_permission(
            &fixture.caller,
            permission.id,
            PermissionUpdate {
                name: None,
                scope: Some(None),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(cleared.scope, None);
    assert_eq!(cleared.name, "crm.read");
}

#[tokio::test]
async fn policies_are_normalized_and_attached() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);
    let permission = service
        .create_permission(
            &fixture.caller,
            PermissionDraft {
                name: "projects".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let policy = service
        .create_policy(&fixture.caller, permission.id, policy_draft(&["Read", "read", "LIST"]))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(policy.resource, "projects:*");
    assert_eq!(policy.verbs, vec!["read".to_owned(), "list".to_owned()]);
    assert_eq!(policy.conditions, json!({"team": "ops"}));

    let updated = service
        .update_policy(
            &fixture.caller,
            permission.id,
            policy.id,
            PolicyUpdate {
                effect: Some(PolicyEffect::Deny),
                ..PolicyUpdate::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.effect, PolicyEffect::Deny);
    assert_eq!(updated.verbs, policy.verbs);

    let listed = service
        .list_permissions(&fixture.caller, Some(&[permission.id][..]))
        .await
        .unwrap_or_default();
    assert_eq!(listed[0].policies, vec![updated]);
}

#[tokio::test]
async fn policy_without_verbs_is_rejected() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);
    let permission = service
        .create_permission(
            &fixture.caller,
            PermissionDraft {
                name: "projects".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = service
        .create_policy(&fixture.caller, permission.id, policy_draft(&[]))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn policies_of_foreign_permissions_are_not_found() {
    let fixture = Fixture::new().await;
    let other = fixture.store.add_organisation("Other").await;
    let outsider = fixture.store.add_user("other@other.test", None).await;
    fixture
        .store
        .add_trust(outsider.id, other.id, Vec::new(), Vec::new(), true)
        .await;
    let other_caller = CallerIdentity::new(outsider.id, "other", None, other.id);
    let service = service(&fixture);
    let foreign = service
        .create_permission(
            &other_caller,
            PermissionDraft {
                name: "foreign".to_owned(),
                scope: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let foreign_policy = service
        .create_policy(&other_caller, foreign.id, policy_draft(&["read"]))
        .await
        .unwrap_or_else(|_| unreachable!());

    let created = service
        .create_policy(&fixture.caller, foreign.id, policy_draft(&["read"]))
        .await;
    let deleted = service
        .delete_policy(&fixture.caller, foreign.id, foreign_policy.id)
        .await;
    let updated = service
        .update_policy(
            &fixture.caller,
            foreign.id,
            PolicyId::new(),
            PolicyUpdate::default(),
        )
        .await;

    assert!(matches!(created, Err(AppError::NotFound(_))));
    assert!(matches!(deleted, Err(AppError::NotFound(_))));
    assert!(matches!(updated, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn non_members_cannot_touch_the_catalogue() {
    let fixture = Fixture::new().await;
    let stranger = fixture.store.add_user("stranger@acme.test", None).await;
    let caller = CallerIdentity::new(stranger.id, "stranger", None, fixture.organisation.id);
    let service = service(&fixture);

    let result = service.list_roles(&caller, None).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
