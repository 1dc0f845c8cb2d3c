//! Argon2id password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher as _,
};

use crate::types::{AuthError, Result};

/// One-way adaptive password hasher. Uses Argon2id with the crate's default
/// parameters, which puts a single verification in the tens of milliseconds
/// on commodity hardware.
#[derive(Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password into a PHC-format string with a fresh salt.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {}", e)))
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// A mismatch returns `Ok(false)`, never an error. A stored string that
    /// does not parse as a PHC hash is a data-integrity failure and returns
    /// `CorruptCredential` carrying the owning credential's id.
    pub fn verify(&self, plaintext: &str, stored_hash: &str, credential_id: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|_| AuthError::CorruptCredential(credential_id.to_string()))?;

        Ok(self
            .argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    }
}
