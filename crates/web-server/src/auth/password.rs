use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

#[derive(Debug, thiserror::Error)]
#[error("Failed to hash password: {0}")]
pub struct HashPasswordError(argon2::password_hash::Error);

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, HashPasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(HashPasswordError)
}

/// Checks `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(err) => {
            log::error!("Stored password hash is malformed: {}", err);
            false
        }
    }
}
