use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// SHA-256 of the UTF-8 credential as lowercase hex.
///
/// Unsalted so that digests produced by the legacy browser client verify.
pub fn hash(plaintext: &str) -> String {
    format!("{:x}", Sha256::digest(plaintext.as_bytes()))
}

/// Checks `plaintext` against a stored digest without an early exit on the
/// first mismatching byte.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let computed = hash(plaintext);
    let (a, b) = (computed.as_bytes(), digest.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Salted Argon2 PHC string for the configured admin password.
pub fn hash_admin_password(password: &str) -> Result<String, AppError> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Validation(format!("cannot hash admin password: {e}")))
}

pub fn verify_admin_password(password: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
