// ============================
// crates/backend-lib/src/session/handle.rs
// ============================
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};

use super::{OpenedSession, Session, SessionManager};
use crate::error::AppError;
use crate::AppState;

/// The session of one request.
///
/// Mutations stay in memory until [`save`](Self::save) seals them into a
/// `Set-Cookie`; [`destroy`](Self::destroy) resets the fields and expires the
/// cookie. Return the handle from a handler to emit the scheduled header.
pub struct SessionHandle {
    session: Session,
    sid: Option<String>,
    expires_at: Option<i64>,
    manager: Arc<SessionManager>,
    pending: Option<HeaderValue>,
}

impl SessionHandle {
    pub(super) fn new(opened: OpenedSession, manager: Arc<SessionManager>) -> Self {
        Self {
            session: opened.session,
            sid: opened.sid,
            expires_at: opened.expires_at,
            manager,
            pending: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Re-seal every field and schedule the cookie
    pub fn save(&mut self) -> Result<(), AppError> {
        let sealed = self.manager.codec().seal(&self.session)?;
        let header = HeaderValue::from_str(&self.manager.cookie().issue(&sealed.token))
            .map_err(|e| AppError::Internal(format!("session cookie header: {e}")))?;

        self.sid = Some(sealed.sid);
        self.expires_at = Some(sealed.expires_at);
        self.pending = Some(header);
        Ok(())
    }

    /// Reset to the logged-out defaults and expire the cookie.
    ///
    /// The id of the cookie this request arrived with is revoked, so replaying
    /// its bytes later yields a logged-out session.
    pub fn destroy(&mut self) {
        if let (Some(sid), Some(expires_at)) = (self.sid.take(), self.expires_at.take()) {
            self.manager.codec().revoke(&sid, expires_at);
        }
        self.session = Session::default();
        self.pending = HeaderValue::from_str(&self.manager.cookie().expire()).ok();
    }

    /// The `Set-Cookie` value scheduled by the last `save` or `destroy`
    pub fn pending_cookie(&self) -> Option<&HeaderValue> {
        self.pending.as_ref()
    }
}

impl FromRequestParts<Arc<AppState>> for SessionHandle {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.load(&parts.headers))
    }
}

impl IntoResponseParts for SessionHandle {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(cookie) = self.pending {
            res.headers_mut().append(SET_COOKIE, cookie);
        }
        Ok(res)
    }
}
