// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the Ex Libris web client and server.
//! This module defines the JSON bodies of the auth API and the admin genre API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier type for stored users
pub type UserId = String;

/// Body of `POST /api/auth/register`
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation failure instead of a deserialization failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`
///
/// Clients may send either `identifier` (email or username) or `email`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// The identifier to look the user up by, preferring `identifier` over `email`
    pub fn lookup_key(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// Publicly visible user fields. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The subset of a user echoed back after registration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: UserId,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub is_logged_in: bool,
    pub user: UserPublic,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogoutResponse {
    pub message: String,
}

/// Body of `GET /api/auth/me`. Anonymous callers get `{"isLoggedIn": false}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<UserPublic>,
    /// When the current session was established by a login
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub session_created_at: Option<DateTime<Utc>>,
}

impl MeResponse {
    pub fn anonymous() -> Self {
        Self {
            is_logged_in: false,
            user: None,
            session_created_at: None,
        }
    }
}

/// A book genre managed from the admin pages
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// Body of `POST /admin/genres` and `PUT /admin/genres/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GenreRequest {
    pub name: Option<String>,
}
