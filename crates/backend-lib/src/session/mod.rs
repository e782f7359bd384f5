// ============================
// crates/backend-lib/src/session/mod.rs
// ============================
//! Cookie-backed sessions.
//!
//! The server keeps no session table: the cookie is the session, sealed by
//! [`SessionCodec`]. [`SessionManager`] ties the codec to the cookie policy
//! and hands out one [`SessionHandle`] per request.

pub mod codec;
mod handle;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};
use exlibris_common::UserPublic;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionSettings;
use crate::metrics::SESSION_REJECTED;

pub use codec::{OpenedSession, SealedToken, SessionCodec, SessionError};
pub use handle::SessionHandle;

/// Identity claims carried by the session cookie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_logged_in: bool,
    /// When the session was established by a login
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A logged-in session for `user`, established at `now`
    pub fn establish(user: &UserPublic, now: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user.id.clone()),
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            is_admin: user.is_admin,
            is_logged_in: true,
            created_at: Some(now),
        }
    }

    /// The cached identity, if the session is logged in and names a user.
    ///
    /// The account's creation time is not cached in the cookie, so
    /// `created_at` is always `None` here.
    pub fn identity(&self) -> Option<UserPublic> {
        if !self.is_logged_in {
            return None;
        }
        Some(UserPublic {
            id: self.user_id.clone()?,
            username: self.username.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            is_admin: self.is_admin,
            created_at: None,
        })
    }
}

/// Fixed attributes of the session cookie
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub name: String,
    pub max_age_secs: u64,
    /// Adds `Secure`; enabled in production
    pub secure: bool,
}

impl CookiePolicy {
    fn attributes(&self, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
    }

    /// `Set-Cookie` value carrying a sealed token
    pub fn issue(&self, token: &str) -> String {
        format!("{}={}; {}", self.name, token, self.attributes(self.max_age_secs))
    }

    /// `Set-Cookie` value that makes the browser drop the cookie immediately
    pub fn expire(&self) -> String {
        format!(
            "{}=; {}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name,
            self.attributes(0)
        )
    }

    /// Find this cookie's value among the request's `Cookie` headers
    pub fn extract<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value)
    }
}

/// Codec plus cookie policy, shared by every request
pub struct SessionManager {
    codec: SessionCodec,
    cookie: CookiePolicy,
}

impl SessionManager {
    pub fn new(codec: SessionCodec, cookie: CookiePolicy) -> Self {
        Self { codec, cookie }
    }

    /// Build from settings; fails when the secret is missing or weak
    pub fn from_settings(settings: &SessionSettings) -> Result<Self, SessionError> {
        let secret = settings
            .secret
            .as_deref()
            .ok_or(SessionError::MissingSecret)?;
        let codec = SessionCodec::new(secret, Duration::from_secs(settings.ttl_secs))?;
        let cookie = CookiePolicy {
            name: settings.cookie_name.clone(),
            max_age_secs: settings.ttl_secs,
            secure: settings.secure,
        };
        Ok(Self::new(codec, cookie))
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn cookie(&self) -> &CookiePolicy {
        &self.cookie
    }

    /// Decode the request's cookie into a handle.
    ///
    /// Never fails: an unreadable cookie is treated as no cookie.
    pub fn load(self: &Arc<Self>, headers: &HeaderMap) -> SessionHandle {
        let opened = match self.codec.open(self.cookie.extract(headers)) {
            Ok(opened) => opened,
            Err(e) => {
                debug!(reason = %e, "discarding session cookie");
                metrics::counter!(SESSION_REJECTED).increment(1);
                OpenedSession::default()
            },
        };
        SessionHandle::new(opened, Arc::clone(self))
    }

    /// Read-only view of the request's session for the gates; failures are not counted
    pub fn peek(&self, headers: &HeaderMap) -> Session {
        self.codec
            .open(self.cookie.extract(headers))
            .map(|opened| opened.session)
            .unwrap_or_default()
    }
}
