//! Argon2id password hashing and verification.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use posthub_auth::store::{AuthenticationFailed, CredentialVerifier, PasswordHasher};
use posthub_core::{IamError, IamResult};

/// One object serves both seams: hashing on registration and password change,
/// verification on login.
#[derive(Default, Clone)]
pub struct Argon2Credentials;

impl PasswordHasher for Argon2Credentials {
    fn hash(&self, raw: &str) -> IamResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IamError::store(format!("password hashing failed: {e}")))
    }
}

impl CredentialVerifier for Argon2Credentials {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<(), AuthenticationFailed> {
        let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthenticationFailed)?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|_| AuthenticationFailed)
    }
}
