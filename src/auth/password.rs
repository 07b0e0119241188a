use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;

// Fixed work factor: 19 MiB memory, 2 passes, 1 lane.
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext secret with Argon2id and a fresh random salt.
///
/// The result is a self-describing PHC string, so two calls with the same
/// input produce different hashes that both verify.
pub fn hash_secret(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verifies a plaintext secret against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch. The digest comparison inside the argon2
/// crate is constant-time. Only an unparsable hash is an error.
pub fn verify_secret(plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    Ok(hasher()?
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Runs `hash_secret` on the blocking pool so the async executor is not stalled
/// by the work factor.
pub async fn hash_secret_blocking(plaintext: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_secret(&plaintext))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}

pub async fn verify_secret_blocking(plaintext: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_secret(&plaintext, &hash))
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
}
