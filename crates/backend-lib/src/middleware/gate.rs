use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::metrics::GATE_DENIED;
use crate::AppState;

/// Edge gate: checks the request path against the configured prefixes
/// before any handler runs
pub async fn enforce_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let session = state.sessions.peek(request.headers());
    let decision = state.gate.evaluate(request.uri().path(), &session);

    match state.gate.redirect(decision) {
        None => next.run(request).await,
        Some(redirect) => {
            debug!(path = %request.uri().path(), ?decision, "edge gate denied request");
            metrics::counter!(GATE_DENIED, "layer" => "edge").increment(1);
            redirect.into_response()
        },
    }
}
