// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};
use zeroize::Zeroize;

use crate::config::{HashingSettings, PasswordRequirements};
use crate::error::AppError;

/// Length of the derived key stored in the PHC string
const OUTPUT_LEN: usize = 32;

fn params(settings: HashingSettings) -> Result<Params, AppError> {
    Params::new(settings.log_n, settings.r, settings.p, OUTPUT_LEN)
        .map_err(|e| AppError::Internal(format!("invalid scrypt params: {e}")))
}

/// Hash a password using scrypt with the given cost
pub fn hash_password(plain: &str, settings: HashingSettings) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params(settings)?, &salt)
        .map_err(|e| AppError::Internal(format!("hash password: {e}")))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash.
///
/// The cost parameters are read from the hash itself; an unparsable hash never verifies.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.chars().count() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}

/// Hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, settings: HashingSettings) -> Result<String, AppError> {
    let hash = hash_password(plain, settings);
    plain.zeroize();
    hash
}
