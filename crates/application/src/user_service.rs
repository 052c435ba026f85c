//! Password login, onboarding redemption and account lookups.
//!
//! Login failures are reported generically so callers cannot learn which
//! emails have accounts.


use std::sync::Arc;

use tracing::{info, warn};
use trustgate_core::{AppError, AppResult, CallerIdentity, OrganisationId};
use trustgate_domain::{EmailAddress, OnboardingTokenKind, Trust, User, validate_password};

use crate::{OnboardingTokenCodec, TrustRepository, TrustService, UserRepository};

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched and the user has an organisation to work in.
    Authenticated(CallerIdentity),
    /// Authentication failed. Deliberately carries no reason.
    Failed,
}

/// Payload presented when following an onboarding link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingRedemption {
    /// Signed onboarding token.
    pub token: String,
    /// Password to set. Required for signup tokens.
    pub password: Option<String>,
    /// Name to set on the account.
    pub name: Option<String>,
}

/// Application service for user authentication and onboarding.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    trust_repository: Arc<dyn TrustRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_codec: Arc<dyn OnboardingTokenCodec>,
    trust_service: TrustService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        trust_repository: Arc<dyn TrustRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_codec: Arc<dyn OnboardingTokenCodec>,
        trust_service: TrustService,
    ) -> Self {
        Self {
            user_repository,
            trust_repository,
            password_hasher,
            token_codec,
            trust_service,
        }
    }

    /// Authenticates with email and password.
    ///
    /// The session lands in the organisation the user last switched into,
    /// or the first organisation with an active trust.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let Ok(email) = EmailAddress::new(email) else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(LoginOutcome::Failed);
        };

        let Some(credentials) = self
            .user_repository
            .find_credentials_by_email(&email)
            .await?
        else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(LoginOutcome::Failed);
        };

        let Some(stored_hash) = credentials.password_hash.as_deref() else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(LoginOutcome::Failed);
        };

        if !self
            .password_hasher
            .verify_password(password, stored_hash)?
        {
            warn!(user_id = %credentials.user.id, "login rejected: invalid password");
            return Ok(LoginOutcome::Failed);
        }

        let user = credentials.user;
        if user.inactive {
            warn!(user_id = %user.id, "login rejected: account inactive");
            return Ok(LoginOutcome::Failed);
        }

        let trusts = self.trust_repository.list_trusts_for_user(user.id).await?;
        let Some(organisation_id) = landing_organisation(&user, &trusts) else {
            warn!(user_id = %user.id, "login rejected: no active organisation");
            return Ok(LoginOutcome::Failed);
        };

        info!(user_id = %user.id, %organisation_id, "user logged in");
        Ok(LoginOutcome::Authenticated(identity_for(&user, organisation_id)))
    }

    /// Redeems an onboarding token and returns the identity to sign in with.
    ///
    /// Signup tokens require a password; join tokens only accept the trust.
    pub async fn complete_onboarding(
        &self,
        redemption: OnboardingRedemption,
    ) -> AppResult<CallerIdentity> {
        let claims = self.token_codec.verify(redemption.token.trim())?;

        let user = self
            .user_repository
            .find_user(claims.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("onboarding token is no longer valid".to_owned())
            })?;
        let trust = self
            .trust_repository
            .find_trust(user.id, claims.organisation_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("onboarding token is no longer valid".to_owned())
            })?;
        if trust.inactive || user.inactive {
            return Err(AppError::Forbidden(
                "this invitation has been revoked".to_owned(),
            ));
        }

        if claims.kind == OnboardingTokenKind::Signup {
            // A signup link sets the first password only.
            if trust.accepted || self.has_password(&user).await? {
                return Err(AppError::Unauthorized(
                    "onboarding token is no longer valid".to_owned(),
                ));
            }

            let password = redemption.password.as_deref().ok_or_else(|| {
                AppError::Validation("a password is required to complete signup".to_owned())
            })?;
            validate_password(password)?;
            let password_hash = self.password_hasher.hash_password(password)?;
            self.user_repository
                .set_password_hash(user.id, &password_hash)
                .await?;
        }

        let user = match redemption
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => {
                self.user_repository.update_user_name(user.id, name).await?;
                User {
                    name: Some(name.to_owned()),
                    ..user
                }
            }
            None => user,
        };

        if !trust.accepted {
            self.trust_service
                .accept_trust(user.id, claims.organisation_id)
                .await?;
        }
        self.user_repository
            .set_last_organisation(user.id, claims.organisation_id)
            .await?;

        Ok(identity_for(&user, claims.organisation_id))
    }

    async fn has_password(&self, user: &User) -> AppResult<bool> {
        let email = EmailAddress::new(&user.email)?;
        Ok(self
            .user_repository
            .find_credentials_by_email(&email)
            .await?
            .is_some_and(|credentials| credentials.password_hash.is_some()))
    }

    /// Returns the caller's user account.
    pub async fn current_user(&self, caller: &CallerIdentity) -> AppResult<User> {
        self.user_repository
            .find_user(caller.user_id())
            .await?
            .ok_or_else(|| AppError::Unauthorized("session user no longer exists".to_owned()))
    }
}

fn landing_organisation(user: &User, trusts: &[Trust]) -> Option<OrganisationId> {
    let active = || trusts.iter().filter(|trust| trust.grants_access());

    user.last_organisation
        .filter(|last| active().any(|trust| trust.organisation_id == *last))
        .or_else(|| active().map(|trust| trust.organisation_id).min())
}

fn identity_for(user: &User, organisation_id: OrganisationId) -> CallerIdentity {
    CallerIdentity::new(
        user.id,
        user.display_name(),
        Some(user.email.clone()),
        organisation_id,
    )
}
