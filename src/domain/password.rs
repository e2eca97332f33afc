//! Password value object - Domain layer password handling.
//!
//! Stored credentials are the hex SHA-256 digest of the plain text, with no
//! salt and a single iteration. That matches the digests already present in
//! the `usuarios` table, so accounts keep working, but it is not adequate for
//! new deployments: a production rollout needs a salted, iterated hash with a
//! migration path for existing rows.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::password_policy::validate_password;
use crate::errors::{AppError, AppResult};

/// Length of a stored digest in hex characters (256 bits).
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Hex-encoded SHA-256 digest of `plain_text`.
///
/// Deterministic: equal inputs always produce the same 64-character output.
pub fn hash_password(plain_text: &str) -> String {
    hex::encode(Sha256::digest(plain_text.as_bytes()))
}

/// Password value object holding the stored digest.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error listing every strength rule the password
    /// breaks.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        let report = validate_password(plain_text);
        if !report.is_valid {
            return Err(AppError::validation(report.errors.join("; ")));
        }

        Ok(Self {
            hash: hash_password(plain_text),
        })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        bool::from(self.hash.as_bytes().ct_eq(hash_password(plain_text).as_bytes()))
    }

    /// Whether the stored value predates hashing and equals `plain_text`.
    ///
    /// Rows imported from the old system may still hold the plain text.
    /// Such values are never empty and always shorter than a digest.
    pub fn is_legacy_plain_text(&self, plain_text: &str) -> bool {
        !self.hash.is_empty()
            && self.hash.len() < DIGEST_HEX_LENGTH
            && bool::from(self.hash.as_bytes().ct_eq(plain_text.as_bytes()))
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}
