use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::{error::ApiError, models::User};

const PHC_PREFIX: &str = "$argon2";

/// hash_password
///
/// Argon2id (default parameters) with a fresh 16-byte salt, returned as a PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_phc(hash: &str, candidate: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("unreadable password hash: {}", e);
            false
        }
    }
}

/// verify_password
///
/// Checks `candidate` against whichever credential the account carries:
/// `hashed_password` when set, otherwise `password`, which is either a PHC string or a
/// legacy plaintext value compared directly.
pub fn verify_password(user: &User, candidate: &str) -> bool {
    if let Some(hash) = user.hashed_password.as_deref().filter(|h| !h.is_empty()) {
        return verify_phc(hash, candidate);
    }
    if user.password.starts_with(PHC_PREFIX) {
        return verify_phc(&user.password, candidate);
    }
    !user.password.is_empty() && user.password == candidate
}
