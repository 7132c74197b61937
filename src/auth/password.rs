// Password hashing and verification (Argon2id)

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt.
    /// Returns a PHC-format string.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored PHC hash.
    /// A malformed or empty hash is a mismatch, not an error.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Run a verification that always fails but costs as much as a real one.
    /// Used when the email is unknown so both login failure paths do the same work.
    pub fn verify_against_dummy(password: &str) -> bool {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

        let dummy = DUMMY_HASH.get_or_init(|| Self::hash_password("dummy-password-for-timing").ok());
        if let Some(hash) = dummy {
            let _ = Self::verify_password(password, hash);
        }
        false
    }

    /// Hash on the blocking pool so async workers keep serving requests
    pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// Verify on the blocking pool; `None` hash means "unknown user"
    pub async fn verify_password_async(password: String, hash: Option<String>) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => Self::verify_password(&password, &hash),
            None => Self::verify_against_dummy(&password),
        })
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }
}
