use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};
use exlibris_common::UserPublic;
use tracing::debug;

use super::{decide, Capability};
use crate::metrics::GATE_DENIED;
use crate::AppState;

/// Page-level check, shared by both extractors
fn admit(parts: &Parts, state: &AppState, required: Capability) -> Result<UserPublic, Redirect> {
    let session = state.sessions.peek(&parts.headers);
    let decision = decide(&session, required);

    if let Some(redirect) = state.gate.redirect(decision) {
        debug!(path = %parts.uri.path(), ?decision, "page gate denied request");
        metrics::counter!(GATE_DENIED, "layer" => "page").increment(1);
        return Err(redirect);
    }

    session
        .identity()
        .ok_or_else(|| Redirect::to(state.gate.login_path()))
}

/// Extracts the caller's identity, redirecting anonymous callers to the login page
#[derive(Debug, Clone)]
pub struct RequireLogin(pub UserPublic);

impl FromRequestParts<Arc<AppState>> for RequireLogin {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Capability::LoggedIn).map(Self)
    }
}

/// Extracts an admin identity; non-admins go to the unauthorized page
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub UserPublic);

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Capability::Admin).map(Self)
    }
}
