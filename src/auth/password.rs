//! Argon2 password hashing.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::services::{ServiceError, ServiceResult};

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    if password.is_empty() {
        return Err(ServiceError::Form("password cannot be empty".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))
}

/// Check `candidate` against a stored PHC hash.
///
/// A malformed stored hash is an internal error; a wrong password is `Ok(false)`.
pub fn verify_password(stored_hash: &str, candidate: &str) -> ServiceResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| ServiceError::Internal(format!("stored password hash is invalid: {err}")))?;

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(ServiceError::Internal(format!(
            "password verification failed: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("s3cret-pass").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret-pass").expect("verify"));
        assert!(!verify_password(&hash, "wrong-pass").expect("verify"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(hash_password(""), Err(ServiceError::Form(_))));
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "whatever"),
            Err(ServiceError::Internal(_))
        ));
    }
}
