use trustgate_application::{
    MemberQuery, NewTrust, OrganisationMember, TrustChanges, TrustRepository, UserCredentials,
    UserRepository,
};
use trustgate_domain::EmailAddress;

use super::*;

fn trust_not_found(user_id: UserId, organisation_id: OrganisationId) -> AppError {
    AppError::NotFound(format!(
        "user '{user_id}' holds no trust in organisation '{organisation_id}'"
    ))
}

fn user_mut(state: &mut IdentityState, user_id: UserId) -> AppResult<&mut User> {
    state
        .users
        .get_mut(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
}

#[async_trait]
impl UserRepository for InMemoryIdentityStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.email == email.as_str())
            .cloned())
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email == email.as_str())
            .map(|user| UserCredentials {
                user: user.clone(),
                password_hash: state.password_hashes.get(&user.id).cloned(),
            }))
    }

    async fn create_user(&self, email: &EmailAddress, name: Option<&str>) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.email == email.as_str()) {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let user = User {
            id: UserId::new(),
            name: name.map(str::to_owned),
            email: email.as_str().to_owned(),
            inactive: false,
            last_organisation: None,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user_name(&self, user_id: UserId, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        user_mut(&mut state, user_id)?.name = Some(name.to_owned());
        Ok(())
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        user_mut(&mut state, user_id)?;
        state
            .password_hashes
            .insert(user_id, password_hash.to_owned());
        Ok(())
    }

    async fn set_last_organisation(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        user_mut(&mut state, user_id)?.last_organisation = Some(organisation_id);
        Ok(())
    }

    async fn list_organisation_members(
        &self,
        organisation_id: OrganisationId,
        query: &MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>> {
        let state = self.state.read().await;
        let mut members: Vec<OrganisationMember> = state
            .trusts
            .values()
            .filter(|trust| trust.organisation_id == organisation_id)
            .filter(|trust| {
                query
                    .user_ids
                    .as_ref()
                    .is_none_or(|user_ids| user_ids.contains(&trust.user_id))
            })
            .filter_map(|trust| {
                state.users.get(&trust.user_id).map(|user| OrganisationMember {
                    user: user.clone(),
                    trust: trust.clone(),
                })
            })
            .filter(|member| {
                !query.active_only || (!member.user.inactive && !member.trust.inactive)
            })
            .collect();
        members.sort_by(|left, right| left.user.email.cmp(&right.user.email));

        Ok(members)
    }
}

#[async_trait]
impl TrustRepository for InMemoryIdentityStore {
    async fn find_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Trust>> {
        Ok(self
            .state
            .read()
            .await
            .trusts
            .get(&(user_id, organisation_id))
            .cloned())
    }

    async fn list_trusts_for_user(&self, user_id: UserId) -> AppResult<Vec<Trust>> {
        let state = self.state.read().await;
        let mut trusts: Vec<Trust> = state
            .trusts
            .values()
            .filter(|trust| trust.user_id == user_id)
            .cloned()
            .collect();
        trusts.sort_by_key(|trust| trust.organisation_id);

        Ok(trusts)
    }

    async fn create_trust(&self, trust: NewTrust) -> AppResult<Trust> {
        let key = (trust.user_id, trust.organisation_id);
        let mut state = self.state.write().await;
        if state.trusts.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds a trust in organisation '{}'",
                trust.user_id, trust.organisation_id
            )));
        }

        let created = Trust {
            user_id: trust.user_id,
            organisation_id: trust.organisation_id,
            trust_type: trust.trust_type,
            accepted: false,
            inactive: false,
            role_ids: trust.role_ids,
            permission_ids: trust.permission_ids,
            issued_by: Some(trust.issued_by),
        };
        state.trusts.insert(key, created.clone());

        Ok(created)
    }

    async fn update_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
        changes: TrustChanges,
    ) -> AppResult<Trust> {
        let mut state = self.state.write().await;
        let trust = state
            .trusts
            .get_mut(&(user_id, organisation_id))
            .ok_or_else(|| trust_not_found(user_id, organisation_id))?;

        if let Some(trust_type) = changes.trust_type {
            trust.trust_type = Some(trust_type);
        }
        if let Some(role_ids) = changes.role_ids {
            trust.role_ids = role_ids;
        }
        if let Some(permission_ids) = changes.permission_ids {
            trust.permission_ids = permission_ids;
        }
        if let Some(inactive) = changes.inactive {
            trust.inactive = inactive;
        }

        Ok(trust.clone())
    }

    async fn accept_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Trust> {
        let mut state = self.state.write().await;
        let trust = state
            .trusts
            .get_mut(&(user_id, organisation_id))
            .ok_or_else(|| trust_not_found(user_id, organisation_id))?;
        trust.accepted = true;

        Ok(trust.clone())
    }
}
