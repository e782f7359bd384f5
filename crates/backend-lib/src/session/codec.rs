// ============================
// crates/backend-lib/src/session/codec.rs
// ============================
//! Sealing sessions into cookie-safe tokens and opening them again.
//!
//! A token is `base64url(nonce || AES-256-GCM(json))`. The JSON carries the
//! session, a random session id and an absolute expiry, so a token is only
//! accepted while `exp` is in the future and its id has not been revoked.
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::Session;
use crate::auth::token_generator::generate_session_id;
use crate::config::MIN_SECRET_LENGTH;

const NONCE_LEN: usize = 12;

/// Why a token could not be opened
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("session secret is not configured")]
    MissingSecret,

    #[error("session secret must be at least {MIN_SECRET_LENGTH} bytes, got {0}")]
    WeakSecret(usize),

    #[error("token is not a sealed session")]
    Malformed,

    #[error("token failed authentication")]
    Tampered,

    #[error("session expired")]
    Expired,

    #[error("session was destroyed")]
    Revoked,

    #[error("could not seal session: {0}")]
    Seal(String),
}

#[derive(Serialize)]
struct SealedRef<'a> {
    s: &'a Session,
    sid: &'a str,
    exp: i64,
}

#[derive(Deserialize)]
struct Sealed {
    s: Session,
    sid: String,
    exp: i64,
}

/// A freshly sealed token and the identity it was issued under
#[derive(Debug, Clone)]
pub struct SealedToken {
    pub token: String,
    pub sid: String,
    pub expires_at: i64,
}

/// Result of opening a cookie value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenedSession {
    pub session: Session,
    /// Absent for the default session produced when no cookie was sent
    pub sid: Option<String>,
    pub expires_at: Option<i64>,
}

/// Encrypts and authenticates sessions with a key derived from the server secret
pub struct SessionCodec {
    cipher: Aes256Gcm,
    ttl: Duration,
    /// Destroyed session ids and the unix time after which they expire anyway
    revoked: DashMap<String, i64>,
}

impl SessionCodec {
    /// Build a codec from the server secret and the cookie lifetime
    pub fn new(secret: &str, ttl: std::time::Duration) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(SessionError::WeakSecret(secret.len()));
        }

        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| SessionError::Seal(format!("create cipher: {e}")))?;
        let ttl = Duration::from_std(ttl).map_err(|e| SessionError::Seal(e.to_string()))?;

        Ok(Self {
            cipher,
            ttl,
            revoked: DashMap::new(),
        })
    }

    /// Seal a session into a token that expires one ttl from now
    pub fn seal(&self, session: &Session) -> Result<SealedToken, SessionError> {
        self.seal_issued_at(session, Utc::now())
    }

    fn seal_issued_at(
        &self,
        session: &Session,
        issued_at: DateTime<Utc>,
    ) -> Result<SealedToken, SessionError> {
        let sid = generate_session_id();
        let expires_at = (issued_at + self.ttl).timestamp();
        let plaintext = serde_json::to_vec(&SealedRef {
            s: session,
            sid: &sid,
            exp: expires_at,
        })
        .map_err(|e| SessionError::Seal(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|e| SessionError::Seal(format!("encrypt: {e}")))?;

        let mut bytes = nonce_bytes.to_vec();
        bytes.extend_from_slice(&ciphertext);

        Ok(SealedToken {
            token: URL_SAFE_NO_PAD.encode(bytes),
            sid,
            expires_at,
        })
    }

    /// Open a cookie value. A missing or empty value yields the default session.
    pub fn open(&self, token: Option<&str>) -> Result<OpenedSession, SessionError> {
        let token = match token.map(str::trim) {
            None | Some("") => return Ok(OpenedSession::default()),
            Some(t) => t,
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| SessionError::Malformed)?;
        if bytes.len() <= NONCE_LEN {
            return Err(SessionError::Malformed);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SessionError::Tampered)?;
        let sealed: Sealed =
            serde_json::from_slice(&plaintext).map_err(|_| SessionError::Malformed)?;

        if sealed.exp <= Utc::now().timestamp() {
            return Err(SessionError::Expired);
        }
        if self.revoked.contains_key(&sealed.sid) {
            return Err(SessionError::Revoked);
        }

        Ok(OpenedSession {
            session: sealed.s,
            sid: Some(sealed.sid),
            expires_at: Some(sealed.exp),
        })
    }

    /// Refuse the given session id until its natural expiry
    pub fn revoke(&self, sid: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
        if expires_at > now {
            self.revoked.insert(sid.to_string(), expires_at);
        }
    }

    /// Number of revoked ids still being tracked
    pub fn revoked_len(&self) -> usize {
        self.revoked.len()
    }
}
