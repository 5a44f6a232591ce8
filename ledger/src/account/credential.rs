//! One-way salted credential hashing.
//!
//! Argon2id with default parameters and a fresh random salt per hash,
//! stored in PHC string format so the parameters travel with the hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors from the hashing primitive itself. A wrong password is not an
/// error; see [`verify_credential`].
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext credential with Argon2id.
pub fn hash_credential(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Returns `true` iff `plaintext` matches the stored PHC `hash`.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_credential(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Runs a full verification against a throwaway hash.
///
/// Used when the username is unknown so that the response time does not
/// reveal whether the account exists.
pub(crate) fn burn_verification(plaintext: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    let dummy = DUMMY_HASH.get_or_init(|| hash_credential("peerledger-dummy-credential").ok());
    if let Some(hash) = dummy {
        let _ = verify_credential(plaintext, hash);
    }
}
