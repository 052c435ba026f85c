use std::fmt::Write;

use sha2::{Digest, Sha256};
use trustgate_core::{AppError, AppResult};

/// Generates a random secret with the given prefix and its SHA-256 digest.
///
/// Returns `(raw_secret, sha256_hex)`.
pub(crate) fn generate_secret(prefix: &str) -> AppResult<(String, String)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate secret: {error}")))?;

    let raw_secret = bytes.iter().fold(
        String::with_capacity(prefix.len() + 64),
        |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        },
    );
    let raw_secret = format!("{prefix}{raw_secret}");

    let digest = digest_secret(&raw_secret);
    Ok((raw_secret, digest))
}

/// Computes the SHA-256 hex digest stored in place of a secret.
pub(crate) fn digest_secret(raw_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_secret.as_bytes());

    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
