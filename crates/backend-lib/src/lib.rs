// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core of the Ex Libris server: accounts, cookie sessions and the
//! authorization gate.

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod session;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::error::AppError;
use crate::gate::GatePolicy;
use crate::session::SessionManager;
use crate::storage::{FlatFileStorage, GenreStore, UserStore};

pub use router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Credential store
    pub users: Arc<dyn UserStore>,
    pub genres: Arc<dyn GenreStore>,
    /// Session codec and cookie policy
    pub sessions: Arc<SessionManager>,
    pub gate: Arc<GatePolicy>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the services together.
    ///
    /// Fails when the session secret is missing or too short, so a server
    /// without a usable key never starts.
    pub fn new(storage: FlatFileStorage, settings: Settings) -> Result<Self, AppError> {
        let sessions = SessionManager::from_settings(&settings.session)?;
        let storage = Arc::new(storage);
        let auth = DefaultAuth::new(storage.clone(), settings.password_hashing);

        Ok(Self {
            auth: Arc::new(auth),
            users: storage.clone(),
            genres: storage,
            sessions: Arc::new(sessions),
            gate: Arc::new(GatePolicy::from_settings(&settings.gate)),
            settings: Arc::new(settings),
        })
    }

    /// Open the flat-file store under `settings.data_dir` and build the state
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let storage = FlatFileStorage::new(&settings.data_dir)?;
        Self::new(storage, settings)
    }
}
