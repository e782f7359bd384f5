// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP routes.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, genres, pages};
use crate::middleware::enforce_gate;
use crate::AppState;

/// Create the application router.
///
/// The edge gate wraps every route; admin and profile handlers check again
/// through their extractors.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me));

    let admin = Router::new()
        .route("/admin/genres", get(genres::list).post(genres::create))
        .route("/admin/genres/{id}", put(genres::rename).delete(genres::delete));

    let pages = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login))
        .route("/register", get(pages::register))
        .route("/unauthorized", get(pages::unauthorized))
        .route("/profile", get(pages::profile));

    Router::new()
        .merge(api)
        .merge(admin)
        .merge(pages)
        .layer(middleware::from_fn_with_state(state.clone(), enforce_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
