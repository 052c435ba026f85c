use trustgate_core::{AppError, CallerIdentity, UserId};

use crate::test_support::Fixture;
use crate::{DirectoryService, MemberQuery};

fn service(fixture: &Fixture) -> DirectoryService {
    DirectoryService::new(
        fixture.authorization_service(),
        fixture.store.clone(),
        fixture.store.clone(),
        fixture.store.clone(),
    )
}

#[tokio::test]
async fn members_follow_requested_order_and_skip_unknown_ids() {
    let fixture = Fixture::new().await;
    let first = fixture.store.add_user("first@acme.test", None).await;
    let second = fixture.store.add_user("second@acme.test", None).await;
    for user in [&first, &second] {
        fixture
            .store
            .add_trust(user.id, fixture.organisation.id, Vec::new(), Vec::new(), true)
            .await;
    }
    let service = service(&fixture);

    let members = service
        .list_members(
            &fixture.caller,
            MemberQuery {
                user_ids: Some(vec![second.id, UserId::new(), first.id]),
                active_only: false,
            },
        )
        .await
        .unwrap_or_default();

    let ids: Vec<UserId> = members.iter().map(|member| member.user.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn active_filter_drops_inactive_users_and_trusts() {
    let fixture = Fixture::new().await;
    let deactivated_trust = fixture.store.add_user("trust@acme.test", None).await;
    let deactivated_user = fixture.store.add_user("user@acme.test", None).await;
    for user in [&deactivated_trust, &deactivated_user] {
        fixture
            .store
            .add_trust(user.id, fixture.organisation.id, Vec::new(), Vec::new(), true)
            .await;
    }
    {
        let mut state = fixture.store.state.lock().await;
        for trust in &mut state.trusts {
            if trust.user_id == deactivated_trust.id {
                trust.inactive = true;
            }
        }
        if let Some(user) = state.users.get_mut(&deactivated_user.id) {
            user.inactive = true;
        }
    }
    let service = service(&fixture);

    let active = service
        .list_members(
            &fixture.caller,
            MemberQuery {
                user_ids: None,
                active_only: true,
            },
        )
        .await
        .unwrap_or_default();
    let everyone = service
        .list_people(&fixture.caller)
        .await
        .unwrap_or_default();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user.id, fixture.admin.id);
    assert_eq!(everyone.len(), 3);
}

#[tokio::test]
async fn members_of_other_organisations_are_invisible() {
    let fixture = Fixture::new().await;
    let other = fixture.store.add_organisation("Other").await;
    let outsider = fixture.store.add_user("outsider@other.test", None).await;
    fixture
        .store
        .add_trust(outsider.id, other.id, Vec::new(), Vec::new(), true)
        .await;
    let service = service(&fixture);

    let members = service
        .list_members(
            &fixture.caller,
            MemberQuery {
                user_ids: Some(vec![outsider.id]),
                active_only: false,
            },
        )
        .await
        .unwrap_or_default();

    assert!(members.is_empty());
}

#[tokio::test]
async fn current_organisation_requires_membership() {
    let fixture = Fixture::new().await;
    let service = service(&fixture);
    let stranger = CallerIdentity::new(UserId::new(), "nobody", None, fixture.organisation.id);

    assert_eq!(
        service.current_organisation(&fixture.caller).await.ok(),
        Some(fixture.organisation.clone())
    );
    assert!(matches!(
        service.current_organisation(&stranger).await,
        Err(AppError::Forbidden(_))
    ));
}
