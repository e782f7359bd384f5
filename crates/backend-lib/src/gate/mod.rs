// ============================
// crates/backend-lib/src/gate/mod.rs
// ============================
//! Authorization gate.
//!
//! One decision function, two enforcement points: the edge middleware in
//! [`crate::middleware::gate`] and the page extractors in [`guards`]. Both
//! turn a denial into a redirect built by the same [`GatePolicy`].

mod guards;

use axum::response::Redirect;

use crate::config::GateSettings;
use crate::session::Session;

pub use guards::{RequireAdmin, RequireLogin};

/// What a path demands of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Public,
    LoggedIn,
    Admin,
}

/// Outcome of checking a session against a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

/// Decide whether `session` satisfies `required`
pub fn decide(session: &Session, required: Capability) -> GateDecision {
    let authenticated = session.identity().is_some();
    match required {
        Capability::Public => GateDecision::Allow,
        Capability::LoggedIn if authenticated => GateDecision::Allow,
        Capability::Admin if authenticated && session.is_admin => GateDecision::Allow,
        Capability::Admin if authenticated => GateDecision::RedirectToUnauthorized,
        Capability::LoggedIn | Capability::Admin => GateDecision::RedirectToLogin,
    }
}

/// Path prefixes and redirect targets of the gate
#[derive(Debug, Clone)]
pub struct GatePolicy {
    admin_prefixes: Vec<String>,
    protected_prefixes: Vec<String>,
    login_path: String,
    unauthorized_path: String,
}

/// `prefix` matches `path` on a segment boundary: `/admin` covers
/// `/admin` and `/admin/genres` but not `/administrator`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl GatePolicy {
    pub fn from_settings(settings: &GateSettings) -> Self {
        Self {
            admin_prefixes: settings.admin_prefixes.clone(),
            protected_prefixes: settings.protected_prefixes.clone(),
            login_path: settings.login_path.clone(),
            unauthorized_path: settings.unauthorized_path.clone(),
        }
    }

    /// The capability the edge gate enforces for `path`. Admin prefixes win.
    pub fn required_for(&self, path: &str) -> Capability {
        if self.admin_prefixes.iter().any(|p| under_prefix(path, p)) {
            Capability::Admin
        } else if self.protected_prefixes.iter().any(|p| under_prefix(path, p)) {
            Capability::LoggedIn
        } else {
            Capability::Public
        }
    }

    pub fn evaluate(&self, path: &str, session: &Session) -> GateDecision {
        decide(session, self.required_for(path))
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The redirect for a denial, `None` when the request may proceed
    pub fn redirect(&self, decision: GateDecision) -> Option<Redirect> {
        match decision {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin => Some(Redirect::to(&self.login_path)),
            GateDecision::RedirectToUnauthorized => Some(Redirect::to(&self.unauthorized_path)),
        }
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::from_settings(&GateSettings::default())
    }
}
