//! Shared fakes for service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use trustgate_core::{AppError, AppResult, CallerIdentity, OrganisationId, UserId};
use trustgate_domain::{
    ApiKey, ApiKeyId, Application, ApplicationId, EmailAddress, Organisation, Permission,
    PermissionId, PermissionPolicy, PolicyId, Role, RoleId, Trust, User,
};
use url::Url;

use crate::{
    AccessControlRepository, ApiKeyRepository, ApiKeyUpdate, ApplicationInput,
    ApplicationRepository, AuditEvent, AuditRepository, AuthorizationService, EmailService,
    MemberQuery, NewApiKey, NewTrust, NotificationDispatcher, OnboardingClaims,
    OnboardingTokenCodec, OrganisationMember, OrganisationRepository, PasswordHasher,
    PermissionDraft, PermissionUpdate, PolicyDraft, PolicyUpdate, RoleDraft, RoleUpdate,
    SeededOrganisation, TrustChanges, TrustRepository, UserCredentials, UserRepository,
};

#[derive(Default)]
pub(crate) struct FakeState {
    pub organisations: HashMap<OrganisationId, Organisation>,
    pub installed: Vec<(OrganisationId, ApplicationId)>,
    pub applications: HashMap<ApplicationId, Application>,
    pub users: HashMap<UserId, User>,
    pub password_hashes: HashMap<UserId, String>,
    pub trusts: Vec<Trust>,
    pub roles: HashMap<RoleId, Role>,
    pub permissions: HashMap<PermissionId, Permission>,
    pub api_keys: HashMap<ApiKeyId, (ApiKey, String)>,
    pub audit_events: Vec<AuditEvent>,
}

/// Single fake backing every repository port.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub state: Mutex<FakeState>,
}

fn pick<T: Clone, I: PartialEq>(
    rows: impl Iterator<Item = T>,
    ids: Option<&[I]>,
    id_of: impl Fn(&T) -> I,
) -> Vec<T> {
    rows.filter(|row| ids.is_none_or(|ids| ids.contains(&id_of(row))))
        .collect()
}

impl FakeStore {
    pub async fn add_organisation(&self, name: &str) -> Organisation {
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: name.to_owned(),
        };
        self.state
            .lock()
            .await
            .organisations
            .insert(organisation.id, organisation.clone());
        organisation
    }

    pub async fn add_user(&self, email: &str, name: Option<&str>) -> User {
        let user = User {
            id: UserId::new(),
            name: name.map(str::to_owned),
            email: email.to_owned(),
            inactive: false,
            last_organisation: None,
        };
        self.state.lock().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
        role_ids: Vec<RoleId>,
        permission_ids: Vec<PermissionId>,
        accepted: bool,
    ) -> Trust {
        let trust = Trust {
            user_id,
            organisation_id,
            trust_type: None,
            accepted,
            inactive: false,
            role_ids,
            permission_ids,
            issued_by: None,
        };
        self.state.lock().await.trusts.push(trust.clone());
        trust
    }

    pub async fn add_application(
        &self,
        slug: &str,
        installed_in: Option<OrganisationId>,
    ) -> Application {
        let application = Application {
            id: ApplicationId::new(),
            name: slug.to_owned(),
            backend_url: None,
            entrypoint: None,
            slug: slug.to_owned(),
            public_key: None,
        };
        let mut state = self.state.lock().await;
        state.applications.insert(application.id, application.clone());
        if let Some(organisation_id) = installed_in {
            state.installed.push((organisation_id, application.id));
        }
        application
    }

    pub async fn audit_actions(&self) -> Vec<trustgate_domain::AuditAction> {
        self.state
            .lock()
            .await
            .audit_events
            .iter()
            .map(|event| event.action)
            .collect()
    }
}

/// Organisation with one active administrator, ready for service calls.
pub(crate) struct Fixture {
    pub store: Arc<FakeStore>,
    pub organisation: Organisation,
    pub admin: User,
    pub caller: CallerIdentity,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(FakeStore::default());
        let organisation = store.add_organisation("Acme").await;
        let admin = store.add_user("admin@acme.test", Some("Ada Admin")).await;
        store
            .add_trust(admin.id, organisation.id, Vec::new(), Vec::new(), true)
            .await;
        let caller = CallerIdentity::new(
            admin.id,
            "Ada Admin",
            Some(admin.email.clone()),
            organisation.id,
        );

        Self {
            store,
            organisation,
            admin,
            caller,
        }
    }

    pub fn authorization_service(&self) -> AuthorizationService {
        AuthorizationService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit_events.push(event);
        Ok(())
    }
}

#[async_trait]
impl OrganisationRepository for FakeStore {
    async fn find_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Organisation>> {
        Ok(self
            .state
            .lock()
            .await
            .organisations
            .get(&organisation_id)
            .cloned())
    }

    async fn list_organisations(
        &self,
        organisation_ids: &[OrganisationId],
    ) -> AppResult<Vec<Organisation>> {
        let state = self.state.lock().await;
        Ok(organisation_ids
            .iter()
            .filter_map(|id| state.organisations.get(id).cloned())
            .collect())
    }

    async fn create_organisation(
        &self,
        name: &str,
        default_role_name: &str,
    ) -> AppResult<SeededOrganisation> {
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: name.to_owned(),
        };
        let default_role = Role {
            id: RoleId::new(),
            organisation_id: organisation.id,
            name: default_role_name.to_owned(),
            permission_ids: Vec::new(),
            application_ids: Vec::new(),
        };
        let mut state = self.state.lock().await;
        state
            .organisations
            .insert(organisation.id, organisation.clone());
        state.roles.insert(default_role.id, default_role.clone());
        Ok(SeededOrganisation {
            organisation,
            default_role,
        })
    }

    async fn rename_organisation(
        &self,
        organisation_id: OrganisationId,
        name: &str,
    ) -> AppResult<Organisation> {
        let mut state = self.state.lock().await;
        let organisation = state
            .organisations
            .get_mut(&organisation_id)
            .ok_or_else(|| AppError::NotFound("organisation not found".to_owned()))?;
        organisation.name = name.to_owned();
        Ok(organisation.clone())
    }

    async fn list_installed_applications(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Vec<Application>> {
        let state = self.state.lock().await;
        Ok(state
            .installed
            .iter()
            .filter(|(organisation, _)| *organisation == organisation_id)
            .filter_map(|(_, application_id)| state.applications.get(application_id).cloned())
            .collect())
    }

    async fn install_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.installed.contains(&(organisation_id, application_id)) {
            state.installed.push((organisation_id, application_id));
        }
        Ok(())
    }

    async fn uninstall_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        self.state
            .lock()
            .await
            .installed
            .retain(|entry| *entry != (organisation_id, application_id));
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for FakeStore {
    async fn list_applications(
        &self,
        application_ids: Option<&[ApplicationId]>,
    ) -> AppResult<Vec<Application>> {
        let state = self.state.lock().await;
        Ok(pick(state.applications.values().cloned(), application_ids, |app| app.id))
    }

    async fn find_application_by_slug(&self, slug: &str) -> AppResult<Option<Application>> {
        let state = self.state.lock().await;
        Ok(state.applications.values().find(|app| app.slug == slug).cloned())
    }

    async fn find_application_by_public_key(
        &self,
        public_key: &str,
    ) -> AppResult<Option<Application>> {
        let state = self.state.lock().await;
        Ok(state
            .applications
            .values()
            .find(|app| app.public_key.as_deref() == Some(public_key))
            .cloned())
    }

    async fn create_application(&self, input: ApplicationInput) -> AppResult<Application> {
        let mut state = self.state.lock().await;
        if state.applications.values().any(|app| app.slug == input.slug) {
            return Err(AppError::Conflict("slug taken".to_owned()));
        }
        let application = Application {
            id: ApplicationId::new(),
            name: input.name,
            backend_url: input.backend_url,
            entrypoint: input.entrypoint,
            slug: input.slug,
            public_key: input.public_key,
        };
        state.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn update_application(
        &self,
        application_id: ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        let mut state = self.state.lock().await;
        let application = state
            .applications
            .get_mut(&application_id)
            .ok_or_else(|| AppError::NotFound("application not found".to_owned()))?;
        application.name = input.name;
        application.backend_url = input.backend_url;
        application.entrypoint = input.entrypoint;
        application.slug = input.slug;
        application.public_key = input.public_key;
        Ok(application.clone())
    }

    async fn delete_application(&self, application_id: ApplicationId) -> AppResult<Application> {
        let mut state = self.state.lock().await;
        state.installed.retain(|(_, id)| *id != application_id);
        state
            .applications
            .remove(&application_id)
            .ok_or_else(|| AppError::NotFound("application not found".to_owned()))
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email == email.as_str())
            .cloned())
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
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
        let mut state = self.state.lock().await;
        if state.users.values().any(|user| user.email == email.as_str()) {
            return Err(AppError::Conflict("email taken".to_owned()));
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
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        user.name = Some(name.to_owned());
        Ok(())
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.state
            .lock()
            .await
            .password_hashes
            .insert(user_id, password_hash.to_owned());
        Ok(())
    }

    async fn set_last_organisation(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        user.last_organisation = Some(organisation_id);
        Ok(())
    }

    async fn list_organisation_members(
        &self,
        organisation_id: OrganisationId,
        query: &MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>> {
        let state = self.state.lock().await;
        Ok(state
            .trusts
            .iter()
            .filter(|trust| trust.organisation_id == organisation_id)
            .filter(|trust| {
                query
                    .user_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&trust.user_id))
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
            .collect())
    }
}

#[async_trait]
impl TrustRepository for FakeStore {
    async fn find_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Trust>> {
        let state = self.state.lock().await;
        Ok(state
            .trusts
            .iter()
            .find(|trust| trust.user_id == user_id && trust.organisation_id == organisation_id)
            .cloned())
    }

    async fn list_trusts_for_user(&self, user_id: UserId) -> AppResult<Vec<Trust>> {
        let state = self.state.lock().await;
        Ok(state
            .trusts
            .iter()
            .filter(|trust| trust.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_trust(&self, trust: NewTrust) -> AppResult<Trust> {
        let mut state = self.state.lock().await;
        if state.trusts.iter().any(|existing| {
            existing.user_id == trust.user_id && existing.organisation_id == trust.organisation_id
        }) {
            return Err(AppError::Conflict("trust exists".to_owned()));
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
        state.trusts.push(created.clone());
        Ok(created)
    }

    async fn update_trust(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
        changes: TrustChanges,
    ) -> AppResult<Trust> {
        let mut state = self.state.lock().await;
        let trust = state
            .trusts
            .iter_mut()
            .find(|trust| trust.user_id == user_id && trust.organisation_id == organisation_id)
            .ok_or_else(|| AppError::NotFound("trust not found".to_owned()))?;
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
        let mut state = self.state.lock().await;
        let trust = state
            .trusts
            .iter_mut()
            .find(|trust| trust.user_id == user_id && trust.organisation_id == organisation_id)
            .ok_or_else(|| AppError::NotFound("trust not found".to_owned()))?;
        trust.accepted = true;
        Ok(trust.clone())
    }
}

#[async_trait]
impl AccessControlRepository for FakeStore {
    async fn list_roles(
        &self,
        organisation_id: OrganisationId,
        role_ids: Option<&[RoleId]>,
    ) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        Ok(pick(
            state
                .roles
                .values()
                .filter(|role| role.organisation_id == organisation_id)
                .cloned(),
            role_ids,
            |role| role.id,
        ))
    }

    async fn create_role(
        &self,
        organisation_id: OrganisationId,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        let role = Role {
            id: RoleId::new(),
            organisation_id,
            name: draft.name,
            permission_ids: draft.permission_ids,
            application_ids: draft.application_ids,
        };
        self.state.lock().await.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .get_mut(&role_id)
            .filter(|role| role.organisation_id == organisation_id)
            .ok_or_else(|| AppError::NotFound("role not found".to_owned()))?;
        if let Some(name) = update.name {
            role.name = name;
        }
        if let Some(permission_ids) = update.permission_ids {
            role.permission_ids = permission_ids;
        }
        if let Some(application_ids) = update.application_ids {
            role.application_ids = application_ids;
        }
        Ok(role.clone())
    }

    async fn delete_role(
        &self,
        organisation_id: OrganisationId,
        role_id: RoleId,
    ) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state
            .roles
            .get(&role_id)
            .is_none_or(|role| role.organisation_id != organisation_id)
        {
            return Err(AppError::NotFound("role not found".to_owned()));
        }
        for trust in &mut state.trusts {
            trust.role_ids.retain(|id| *id != role_id);
        }
        state
            .roles
            .remove(&role_id)
            .ok_or_else(|| AppError::NotFound("role not found".to_owned()))
    }

    async fn list_permissions(
        &self,
        organisation_id: OrganisationId,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        Ok(pick(
            state
                .permissions
                .values()
                .filter(|permission| permission.organisation_id == organisation_id)
                .cloned(),
            permission_ids,
            |permission| permission.id,
        ))
    }

    async fn create_permission(
        &self,
        organisation_id: OrganisationId,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        let permission = Permission {
            id: PermissionId::new(),
            organisation_id,
            name: draft.name,
            scope: draft.scope,
            policies: Vec::new(),
        };
        self.state
            .lock()
            .await
            .permissions
            .insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        update: PermissionUpdate,
    ) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        let permission = owned_permission(&mut state, organisation_id, permission_id)?;
        if let Some(name) = update.name {
            permission.name = name;
        }
        if let Some(scope) = update.scope {
            permission.scope = scope;
        }
        Ok(permission.clone())
    }

    async fn delete_permission(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        owned_permission(&mut state, organisation_id, permission_id)?;
        for trust in &mut state.trusts {
            trust.permission_ids.retain(|id| *id != permission_id);
        }
        for role in state.roles.values_mut() {
            role.permission_ids.retain(|id| *id != permission_id);
        }
        state
            .permissions
            .remove(&permission_id)
            .ok_or_else(|| AppError::NotFound("permission not found".to_owned()))
    }

    async fn create_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        draft: PolicyDraft,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.lock().await;
        let permission = owned_permission(&mut state, organisation_id, permission_id)?;
        let policy = PermissionPolicy {
            id: PolicyId::new(),
            permission_id,
            name: draft.name,
            resource: draft.resource,
            verbs: draft.verbs,
            effect: draft.effect,
            conditions: draft.conditions,
        };
        permission.policies.push(policy.clone());
        Ok(policy)
    }

    async fn update_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
        update: PolicyUpdate,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.lock().await;
        let permission = owned_permission(&mut state, organisation_id, permission_id)?;
        let policy = permission
            .policies
            .iter_mut()
            .find(|policy| policy.id == policy_id)
            .ok_or_else(|| AppError::NotFound("policy not found".to_owned()))?;
        if let Some(name) = update.name {
            policy.name = name;
        }
        if let Some(resource) = update.resource {
            policy.resource = resource;
        }
        if let Some(verbs) = update.verbs {
            policy.verbs = verbs;
        }
        if let Some(effect) = update.effect {
            policy.effect = effect;
        }
        if let Some(conditions) = update.conditions {
            policy.conditions = conditions;
        }
        Ok(policy.clone())
    }

    async fn delete_policy(
        &self,
        organisation_id: OrganisationId,
        permission_id: PermissionId,
        policy_id: PolicyId,
    ) -> AppResult<PermissionPolicy> {
        let mut state = self.state.lock().await;
        let permission = owned_permission(&mut state, organisation_id, permission_id)?;
        let index = permission
            .policies
            .iter()
            .position(|policy| policy.id == policy_id)
            .ok_or_else(|| AppError::NotFound("policy not found".to_owned()))?;
        Ok(permission.policies.remove(index))
    }
}

fn owned_permission(
    state: &mut FakeState,
    organisation_id: OrganisationId,
    permission_id: PermissionId,
) -> AppResult<&mut Permission> {
    state
        .permissions
        .get_mut(&permission_id)
        .filter(|permission| permission.organisation_id == organisation_id)
        .ok_or_else(|| AppError::NotFound("permission not found".to_owned()))
}

#[async_trait]
impl ApiKeyRepository for FakeStore {
    async fn list_api_keys(&self, organisation_id: OrganisationId) -> AppResult<Vec<ApiKey>> {
        let state = self.state.lock().await;
        Ok(state
            .api_keys
            .values()
            .filter(|(key, _)| key.organisation_id == organisation_id)
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn create_api_key(
        &self,
        organisation_id: OrganisationId,
        key: NewApiKey,
    ) -> AppResult<ApiKey> {
        let api_key = ApiKey {
            id: ApiKeyId::new(),
            organisation_id,
            name: key.name,
            role_ids: key.role_ids,
        };
        self.state
            .lock()
            .await
            .api_keys
            .insert(api_key.id, (api_key.clone(), key.key_digest));
        Ok(api_key)
    }

    async fn update_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
        update: ApiKeyUpdate,
    ) -> AppResult<ApiKey> {
        let mut state = self.state.lock().await;
        let (api_key, _) = state
            .api_keys
            .get_mut(&api_key_id)
            .filter(|(key, _)| key.organisation_id == organisation_id)
            .ok_or_else(|| AppError::NotFound("api key not found".to_owned()))?;
        if let Some(name) = update.name {
            api_key.name = name;
        }
        if let Some(role_ids) = update.role_ids {
            api_key.role_ids = role_ids;
        }
        Ok(api_key.clone())
    }

    async fn delete_api_key(
        &self,
        organisation_id: OrganisationId,
        api_key_id: ApiKeyId,
    ) -> AppResult<ApiKey> {
        let mut state = self.state.lock().await;
        if state
            .api_keys
            .get(&api_key_id)
            .is_none_or(|(key, _)| key.organisation_id != organisation_id)
        {
            return Err(AppError::NotFound("api key not found".to_owned()));
        }
        state
            .api_keys
            .remove(&api_key_id)
            .map(|(key, _)| key)
            .ok_or_else(|| AppError::NotFound("api key not found".to_owned()))
    }

    async fn find_api_key_by_digest(&self, key_digest: &str) -> AppResult<Option<ApiKey>> {
        let state = self.state.lock().await;
        Ok(state
            .api_keys
            .values()
            .find(|(_, digest)| digest == key_digest)
            .map(|(key, _)| key.clone()))
    }
}

/// Records sent messages and optionally fails every delivery.
#[derive(Default)]
pub(crate) struct FakeEmailService {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl EmailService for FakeEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Transport("smtp relay unavailable".to_owned()));
        }
        self.sent
            .lock()
            .await
            .push((to.to_owned(), subject.to_owned(), text_body.to_owned()));
        Ok(())
    }
}

/// Token codec that serializes claims as JSON.
pub(crate) struct FakeTokenCodec;

impl OnboardingTokenCodec for FakeTokenCodec {
    fn sign(&self, claims: &OnboardingClaims) -> AppResult<String> {
        serde_json::to_string(claims).map_err(|error| AppError::Internal(error.to_string()))
    }

    fn verify(&self, token: &str) -> AppResult<OnboardingClaims> {
        serde_json::from_str(token)
            .map_err(|_| AppError::Unauthorized("invalid onboarding token".to_owned()))
    }
}

/// Reversible hasher for tests.
pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

pub(crate) fn dispatcher(email_service: Option<Arc<FakeEmailService>>) -> NotificationDispatcher {
    NotificationDispatcher::new(
        email_service.map(|service| service as Arc<dyn EmailService>),
        Arc::new(FakeTokenCodec),
        Url::parse("https://app.trustgate.test/").unwrap_or_else(|_| unreachable!()),
    )
}
