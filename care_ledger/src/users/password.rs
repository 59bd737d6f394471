//! Password hashing with Argon2id and a server-side pepper.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::errors::{UserError, UserResult};

/// Hash a password with Argon2id, mixing in the server-side pepper.
pub fn hash_password(password: &str, pepper: &str) -> UserResult<String> {
    let peppered = format!("{}{}", password, pepper);
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(peppered.as_bytes(), &salt)
        .map_err(|_| UserError::HashingFailed)?
        .to_string())
}

/// Verify a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str, pepper: &str) -> UserResult<()> {
    let peppered = format!("{}{}", password, pepper);
    let parsed_hash = PasswordHash::new(hash).map_err(|_| UserError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(peppered.as_bytes(), &parsed_hash)
        .map_err(|_| UserError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse", "pepper").unwrap();
        assert!(verify_password("correct horse", &hash, "pepper").is_ok());
    }

    #[test]
    fn wrong_password_or_pepper_is_rejected() {
        let hash = hash_password("correct horse", "pepper").unwrap();
        assert!(verify_password("wrong horse", &hash, "pepper").is_err());
        assert!(verify_password("correct horse", &hash, "other-pepper").is_err());
    }

    #[test]
    fn garbage_hash_is_rejected_not_panicked_on() {
        assert!(verify_password("anything", "not-a-phc-string", "pepper").is_err());
    }
}
