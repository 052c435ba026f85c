use trustgate_application::{
    AccessControlRepository, ApiKeyRepository, AuditEvent, AuditRepository, MemberQuery,
    NewApiKey, NewTrust, OrganisationRepository, RoleDraft, TrustChanges, TrustRepository,
    UserRepository,
};
use trustgate_core::{AppError, OrganisationId, UserId};
use trustgate_domain::{AuditAction, DEFAULT_ROLE_NAME, EmailAddress};

use super::InMemoryIdentityStore;

fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| unreachable!())
}

fn new_trust(user_id: UserId, organisation_id: OrganisationId) -> NewTrust {
    NewTrust {
        user_id,
        organisation_id,
        trust_type: None,
        issued_by: user_id,
        role_ids: Vec::new(),
        permission_ids: Vec::new(),
    }
}

#[tokio::test]
async fn duplicate_trust_conflicts() {
    let store = InMemoryIdentityStore::new();
    let organisation_id = OrganisationId::new();
    let user_id = UserId::new();

    assert!(store.create_trust(new_trust(user_id, organisation_id)).await.is_ok());
    let duplicate = store.create_trust(new_trust(user_id, organisation_id)).await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn deleting_role_detaches_it_from_trusts_and_keys() {
    let store = InMemoryIdentityStore::new();
    let seeded = store
        .create_organisation("Acme", DEFAULT_ROLE_NAME)
        .await
        .unwrap_or_else(|_| unreachable!());
    let organisation_id = seeded.organisation.id;
    let role_id = seeded.default_role.id;
    let user = store
        .create_user(&email("ana@acme.test"), Some("Ana"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut payload = new_trust(user.id, organisation_id);
    payload.role_ids = vec![role_id];
    assert!(store.create_trust(payload).await.is_ok());
    let api_key = store
        .create_api_key(
            organisation_id,
            NewApiKey {
                name: "ci".to_owned(),
                key_digest: "digest".to_owned(),
                role_ids: vec![role_id],
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(store.delete_role(organisation_id, role_id).await.is_ok());

    let trust = store
        .find_trust(user.id, organisation_id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert!(trust.role_ids.is_empty());

    let keys = store.list_api_keys(organisation_id).await.unwrap_or_default();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].id, api_key.id);
    assert!(keys[0].role_ids.is_empty());
}

#[tokio::test]
async fn roles_of_other_organisations_are_invisible() {
    let store = InMemoryIdentityStore::new();
    let owner = OrganisationId::new();
    let stranger = OrganisationId::new();
    let role = store
        .create_role(
            owner,
            RoleDraft {
                name: "Editor".to_owned(),
                permission_ids: Vec::new(),
                application_ids: Vec::new(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let listed = store
        .list_roles(stranger, Some(&[role.id][..]))
        .await
        .unwrap_or_default();
    assert!(listed.is_empty());

    let deleted = store.delete_role(stranger, role.id).await;
    assert!(matches!(deleted, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn active_only_members_skip_inactive_trusts() {
    let store = InMemoryIdentityStore::new();
    let organisation_id = OrganisationId::new();
    let active = store
        .create_user(&email("active@acme.test"), None)
        .await
        .unwrap_or_else(|_| unreachable!());
    let benched = store
        .create_user(&email("benched@acme.test"), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    for user_id in [active.id, benched.id] {
        assert!(store.create_trust(new_trust(user_id, organisation_id)).await.is_ok());
    }
    let deactivated = store
        .update_trust(
            benched.id,
            organisation_id,
            TrustChanges {
                trust_type: None,
                role_ids: None,
                permission_ids: None,
                inactive: Some(true),
                modified_by: active.id,
            },
        )
        .await;
    assert!(deactivated.is_ok());

    let query = MemberQuery {
        user_ids: None,
        active_only: true,
    };
    let members = store
        .list_organisation_members(organisation_id, &query)
        .await
        .unwrap_or_default();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user.id, active.id);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let store = InMemoryIdentityStore::new();
    assert!(store.create_user(&email("ana@acme.test"), None).await.is_ok());

    let duplicate = store.create_user(&email("ANA@acme.test"), None).await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn audit_events_are_kept_in_order() {
    let store = InMemoryIdentityStore::new();
    let organisation_id = OrganisationId::new();

    for action in [AuditAction::RoleCreated, AuditAction::RoleDeleted] {
        let appended = store
            .append_event(AuditEvent {
                organisation_id,
                subject: "ada".to_owned(),
                action,
                resource_type: "role".to_owned(),
                resource_id: "r-1".to_owned(),
                detail: None,
            })
            .await;
        assert!(appended.is_ok());
    }

    let actions: Vec<AuditAction> = store
        .audit_events()
        .await
        .into_iter()
        .map(|event| event.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::RoleCreated, AuditAction::RoleDeleted]);
}
