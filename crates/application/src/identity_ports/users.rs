use async_trait::async_trait;
use trustgate_core::{AppResult, OrganisationId, UserId};
use trustgate_domain::{EmailAddress, Trust, User};

/// User record together with its stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User account.
    pub user: User,
    /// Argon2id hash, absent until onboarding sets a password.
    pub password_hash: Option<String>,
}

/// Filter for listing organisation members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberQuery {
    /// Restricts the listing to these users.
    pub user_ids: Option<Vec<UserId>>,
    /// Drops inactive users and inactive trusts.
    pub active_only: bool,
}

/// User projected through their trust in one organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationMember {
    /// Member account.
    pub user: User,
    /// Trust binding the account to the organisation.
    pub trust: Trust,
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by canonical email.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Finds a user and password hash by canonical email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>>;

    /// Creates a bare user. Duplicate emails conflict.
    async fn create_user(&self, email: &EmailAddress, name: Option<&str>) -> AppResult<User>;

    /// Replaces the user's name.
    async fn update_user_name(&self, user_id: UserId, name: &str) -> AppResult<()>;

    /// Stores a new password hash.
    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Records the organisation the user last switched into.
    async fn set_last_organisation(
        &self,
        user_id: UserId,
        organisation_id: OrganisationId,
    ) -> AppResult<()>;

    /// Lists members of an organisation. Filtering happens in the store.
    async fn list_organisation_members(
        &self,
        organisation_id: OrganisationId,
        query: &MemberQuery,
    ) -> AppResult<Vec<OrganisationMember>>;
}
