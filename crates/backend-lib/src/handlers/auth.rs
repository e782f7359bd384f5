// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Endpoints under `/api/auth`.
//!
//! Register and login also take the urlencoded bodies posted by the HTML
//! pages; those callers get a redirect instead of JSON on success.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use exlibris_common::{
    LoginRequest, LoginResponse, LogoutResponse, MeResponse, RegisterRequest, RegisterResponse,
    RegisteredUser,
};

use super::Submitted;
use crate::error::AppError;
use crate::session::SessionHandle;
use crate::validation::{validate_login, validate_registration};
use crate::AppState;

/// `POST /api/auth/register`
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Submitted<RegisterRequest>,
) -> Result<Response, AppError> {
    let (req, from_form) = match body {
        Submitted::Json(req) => (req, false),
        Submitted::Form(req) => (req, true),
    };
    let registration = validate_registration(&req, &state.settings.password_requirements)?;
    let user = state.auth.register(registration).await?;

    if from_form {
        return Ok(Redirect::to("/login").into_response());
    }
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: RegisteredUser {
                id: user.id,
                email: user.email,
            },
        }),
    )
        .into_response())
}

/// `POST /api/auth/login`. The cookie is only set on success.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    mut session: SessionHandle,
    body: Submitted<LoginRequest>,
) -> Result<Response, AppError> {
    let (req, from_form) = match body {
        Submitted::Json(req) => (req, false),
        Submitted::Form(req) => (req, true),
    };
    let credentials = validate_login(&req)?;
    let user = state.auth.login(credentials, &mut session).await?;

    if from_form {
        return Ok((session, Redirect::to("/profile")).into_response());
    }
    Ok((
        session,
        Json(LoginResponse {
            message: "Logged in successfully".to_string(),
            is_logged_in: true,
            user,
        }),
    )
        .into_response())
}

/// `POST /api/auth/logout`
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    mut session: SessionHandle,
) -> (SessionHandle, Json<LogoutResponse>) {
    state.auth.logout(&mut session);
    (
        session,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// `GET /api/auth/me`
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<Arc<AppState>>, session: SessionHandle) -> Response {
    match state.auth.current_user(&session) {
        Ok(user) => Json(MeResponse {
            is_logged_in: true,
            user: Some(user),
            session_created_at: session.session().created_at,
        })
        .into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, Json(MeResponse::anonymous())).into_response(),
    }
}
