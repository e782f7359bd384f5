// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "exlibris.toml";

/// Prefix of environment overrides, nested keys split on `__`
pub const ENV_PREFIX: &str = "EXLIBRIS_";

/// Shortest session secret accepted at startup
pub const MIN_SECRET_LENGTH: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding `users.json` and `genres.json`
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    pub session: SessionSettings,
    pub password_requirements: PasswordRequirements,
    pub password_hashing: HashingSettings,
    pub gate: GateSettings,
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Absolute lifetime of an issued cookie, in seconds
    pub ttl_secs: u64,
    /// Only send the cookie over HTTPS
    pub secure: bool,
    /// Session encryption secret, at least 32 bytes
    pub secret: Option<String>,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Require uppercase letters
    pub require_uppercase: bool,
    /// Require lowercase letters
    pub require_lowercase: bool,
    /// Require digits
    pub require_digit: bool,
    /// Require special characters
    pub require_special: bool,
}

/// scrypt cost parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

/// Route protection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// Path prefixes that require an admin session
    pub admin_prefixes: Vec<String>,
    /// Path prefixes that require any logged-in session
    pub protected_prefixes: Vec<String>,
    pub login_path: String,
    pub unauthorized_path: String,
}

/// Reasons a configuration is refused at startup
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("session secret is not set (EXLIBRIS_SESSION__SECRET)")]
    MissingSecret,

    #[error("session secret must be at least {MIN_SECRET_LENGTH} bytes, got {0}")]
    WeakSecret(usize),

    #[error("session ttl must be greater than zero")]
    ZeroSessionTtl,

    #[error("password min_length must be at least 6 and not above max_length")]
    InvalidPasswordLength,

    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    #[error("gate paths must start with '/': {0}")]
    InvalidGatePath(String),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            log_json: false,
            session: SessionSettings::default(),
            password_requirements: PasswordRequirements::default(),
            password_hashing: HashingSettings::default(),
            gate: GateSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "ex-libris".to_string(),
            ttl_secs: 60 * 60 * 24 * 7, // 7 days
            secure: true,
            secret: None,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        // scrypt's recommended interactive-login cost
        Self { log_n: 17, r: 8, p: 1 }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            admin_prefixes: vec!["/admin".to_string()],
            protected_prefixes: vec!["/profile".to_string()],
            login_path: "/login".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the TOML file, then `EXLIBRIS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Refuse configurations the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        let secret = self.session.secret.as_deref().ok_or(ConfigError::MissingSecret)?;
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret(secret.len()));
        }

        if self.session.ttl_secs == 0 {
            return Err(ConfigError::ZeroSessionTtl);
        }

        let req = &self.password_requirements;
        if req.min_length < 6 || req.min_length > req.max_length {
            return Err(ConfigError::InvalidPasswordLength);
        }

        let gate = &self.gate;
        for path in gate
            .admin_prefixes
            .iter()
            .chain(&gate.protected_prefixes)
            .chain([&gate.login_path, &gate.unauthorized_path])
        {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidGatePath(path.clone()));
            }
        }

        Ok(())
    }
}
