//! Argon2id password digests in PHC string form.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to hash password")]
    Hash(#[source] password_hash::Error),
    #[error("stored password digest is malformed")]
    MalformedDigest(#[source] password_hash::Error),
}

/// Hashes `password` with a fresh random salt, so equal inputs give
/// different digests.
pub fn hash(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(CredentialError::Hash)
}

/// `Ok(false)` on a wrong password; `Err` only when `digest` cannot be parsed.
pub fn verify(password: &str, digest: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(digest).map_err(CredentialError::MalformedDigest)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(CredentialError::MalformedDigest(err)),
    }
}

/// [`hash`] on the blocking pool; Argon2 is deliberately slow.
pub async fn hash_blocking(password: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|_| CredentialError::Hash(password_hash::Error::Crypto))?
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(password: String, digest: String) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || verify(&password, &digest))
        .await
        .map_err(|_| CredentialError::MalformedDigest(password_hash::Error::Crypto))?
}
