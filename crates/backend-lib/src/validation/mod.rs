// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Typed input boundary for the auth and genre endpoints.

use std::sync::LazyLock;

use exlibris_common::{GenreRequest, LoginRequest, RegisterRequest};
use regex::Regex;
use thiserror::Error;

use crate::auth::password::validate_password_strength;
use crate::config::PasswordRequirements;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 32;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_GENRE_NAME_LENGTH: usize = 64;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("username regex"));
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid genre name: {0}")]
    InvalidGenreName(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A registration that passed validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login credentials that are at least present
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> ValidationResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }

    Ok(username)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email address is not well formed".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password against the configured requirements
pub fn validate_password<'a>(
    password: &'a str,
    requirements: &PasswordRequirements,
) -> ValidationResult<&'a str> {
    if password.chars().count() > requirements.max_length {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {} characters",
            requirements.max_length
        )));
    }

    if !validate_password_strength(password, requirements) {
        return Err(ValidationError::InvalidPassword(describe_requirements(
            requirements,
        )));
    }

    Ok(password)
}

fn describe_requirements(req: &PasswordRequirements) -> String {
    let mut parts = vec![format!("at least {} characters", req.min_length)];
    if req.require_uppercase {
        parts.push("an uppercase letter".to_string());
    }
    if req.require_lowercase {
        parts.push("a lowercase letter".to_string());
    }
    if req.require_digit {
        parts.push("a digit".to_string());
    }
    if req.require_special {
        parts.push("a special character".to_string());
    }
    format!("Password must contain {}", parts.join(", "))
}

/// Validate a registration request into a typed [`Registration`]
pub fn validate_registration(
    req: &RegisterRequest,
    requirements: &PasswordRequirements,
) -> ValidationResult<Registration> {
    let username = required(req.username.as_deref(), "username")?.trim();
    let email = required(req.email.as_deref(), "email")?.trim();
    let password = required(req.password.as_deref(), "password")?;

    validate_username(username)?;
    validate_email(email)?;
    validate_password(password, requirements)?;

    Ok(Registration {
        username: username.to_string(),
        email: email.to_ascii_lowercase(),
        password: password.to_string(),
    })
}

/// Validate that a login request carries an identifier and a password.
///
/// No format checks: any mismatch is reported as invalid credentials later.
pub fn validate_login(req: &LoginRequest) -> ValidationResult<Credentials> {
    let identifier = req
        .lookup_key()
        .ok_or(ValidationError::MissingField("identifier"))?;
    let password = required(req.password.as_deref(), "password")?;

    Ok(Credentials {
        identifier: identifier.trim().to_string(),
        password: password.to_string(),
    })
}

/// Validate a genre name, returning it trimmed
pub fn validate_genre(req: &GenreRequest) -> ValidationResult<String> {
    let name = required(req.name.as_deref(), "name")?.trim();

    if name.chars().count() > MAX_GENRE_NAME_LENGTH {
        return Err(ValidationError::InvalidGenreName(format!(
            "Genre name cannot exceed {MAX_GENRE_NAME_LENGTH} characters"
        )));
    }

    if name.chars().any(|c| c.is_control() || matches!(c, '<' | '>')) {
        return Err(ValidationError::InvalidGenreName(
            "Genre name contains invalid characters".to_string(),
        ));
    }

    Ok(name.to_string())
}
