//! User accounts and credential rules.
//!
//! Password strength follows the NIST SP800-63B length guidance for
//! accounts without a second factor.

use serde::{Deserialize, Serialize};
use trustgate_core::{AppError, AppResult, OrganisationId, UserId};

/// User account, independent of any organisation.
///
/// Links to organisations always go through [`crate::Trust`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Optional human name. Bare accounts created by an invite may not have one.
    pub name: Option<String>,
    /// Canonical lowercase email, unique across all users.
    pub email: String,
    /// Account-wide deactivation flag.
    pub inactive: bool,
    /// Organisation the user last switched into.
    pub last_organisation: Option<OrganisationId>,
}

impl User {
    /// Returns the name to show for this user, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.email.as_str())
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    ///
    /// Performs structural validation only: exactly one `@`, non-empty local
    /// part and a domain containing at least one `.`.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let canonical = value.as_ref().trim().to_lowercase();

        if canonical.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = canonical.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if canonical.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length for single-factor accounts.
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Maximum password length, bounding Argon2id work per request.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password chosen during onboarding.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if BREACHED_PASSWORDS.iter().any(|entry| *entry == lowered) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

/// Breached passwords long enough to pass the length rule.
static BREACHED_PASSWORDS: &[&str] = &[
    "1234567890",
    "qwertyuiop",
    "password123",
    "password12",
    "iloveyou12",
    "1q2w3e4r5t",
    "qwerty1234",
    "0987654321",
    "1111111111",
    "letmein123",
    "welcome123",
    "changeme123",
    "administrator",
    "football123",
    "sunshine123",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        let email = EmailAddress::new("  Ana@Example.ORG ");
        assert!(email.is_ok());
        assert_eq!(
            email.unwrap_or_else(|_| unreachable!()).as_str(),
            "ana@example.org"
        );
    }

    #[test]
    fn email_with_two_at_signs_is_rejected() {
        assert!(EmailAddress::new("a@b@example.org").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("ana@localhost").is_err());
    }

    #[test]
    fn empty_email_is_rejected() {
        assert!(matches!(
            EmailAddress::new("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn breached_password_is_rejected_case_insensitively() {
        assert!(validate_password("Password123").is_err());
    }

    #[test]
    fn passphrase_is_accepted() {
        assert!(validate_password("correct horse battery staple").is_ok());
    }

    #[test]
    fn overlong_password_is_rejected() {
        let long = "x".repeat(PASSWORD_MAX_LENGTH + 1);
        assert!(validate_password(&long).is_err());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User {
            id: UserId::new(),
            name: Some("  ".to_owned()),
            email: "ana@example.org".to_owned(),
            inactive: false,
            last_organisation: None,
        };

        assert_eq!(user.display_name(), "ana@example.org");
    }
}
