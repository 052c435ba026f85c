//! HS256 onboarding tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use trustgate_application::{OnboardingClaims, OnboardingTokenCodec};
use trustgate_core::{AppError, AppResult};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Lifetime of an onboarding link.
pub const ONBOARDING_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    onboarding: OnboardingClaims,
    iat: i64,
    exp: i64,
}

/// Signs onboarding claims with a shared secret.
#[derive(Clone)]
pub struct JwtOnboardingTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtOnboardingTokenCodec {
    /// Creates a codec. Secrets shorter than [`MIN_SECRET_LENGTH`] are rejected.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "onboarding token secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ONBOARDING_TOKEN_TTL_DAYS),
        })
    }

    #[cfg(test)]
    fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl OnboardingTokenCodec for JwtOnboardingTokenCodec {
    fn sign(&self, claims: &OnboardingClaims) -> AppResult<String> {
        let now = Utc::now();
        let signed = SignedClaims {
            onboarding: claims.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map_err(|error| {
                AppError::Internal(format!("failed to sign onboarding token: {error}"))
            })
    }

    fn verify(&self, token: &str) -> AppResult<OnboardingClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SignedClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.onboarding)
            .map_err(|error| {
                AppError::Unauthorized(format!("invalid onboarding token: {error}"))
            })
    }
}
