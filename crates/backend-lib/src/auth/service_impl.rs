use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use exlibris_common::UserPublic;
use tracing::{debug, info};
use zeroize::Zeroize;

use super::password::{hash_password_secure, verify_password};
use crate::auth::AuthService;
use crate::config::HashingSettings;
use crate::error::AppError;
use crate::metrics::{AUTH_LOGIN_FAILURE, AUTH_LOGIN_SUCCESS, AUTH_LOGOUT, AUTH_REGISTER};
use crate::session::{Session, SessionHandle};
use crate::storage::{NewUser, UserStore};
use crate::validation::{Credentials, Registration};

pub struct DefaultAuth {
    users: Arc<dyn UserStore>,
    hashing: HashingSettings,
}

impl DefaultAuth {
    pub fn new(users: Arc<dyn UserStore>, hashing: HashingSettings) -> Self {
        Self { users, hashing }
    }

    fn reject(reason: &'static str) -> AppError {
        // The reason is only logged; clients always see the same error
        debug!(reason, "login rejected");
        metrics::counter!(AUTH_LOGIN_FAILURE).increment(1);
        AppError::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register(&self, registration: Registration) -> Result<UserPublic, AppError> {
        let Registration {
            username,
            email,
            mut password,
        } = registration;

        if self.users.find_by_email(&email).await?.is_some() {
            password.zeroize();
            return Err(AppError::DuplicateEmail);
        }

        // Hash on a blocking thread to avoid stalling the runtime
        let hashing = self.hashing;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password_secure(&mut password, hashing))
                .await??;

        let user = self
            .users
            .insert_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        metrics::counter!(AUTH_REGISTER).increment(1);
        info!(user_id = %user.id, "registered");
        Ok(user.to_public())
    }

    async fn login(
        &self,
        credentials: Credentials,
        session: &mut SessionHandle,
    ) -> Result<UserPublic, AppError> {
        let Credentials {
            identifier,
            mut password,
        } = credentials;

        let Some(user) = self.users.find_by_identifier(&identifier).await? else {
            password.zeroize();
            return Err(Self::reject("no such user"));
        };

        let hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || {
            let ok = verify_password(&hash, &password);
            password.zeroize();
            ok
        })
        .await?;

        if !is_valid {
            return Err(Self::reject("password mismatch"));
        }

        let public = user.to_public();
        *session.session_mut() = Session::establish(&public, Utc::now());
        session.save()?;

        metrics::counter!(AUTH_LOGIN_SUCCESS).increment(1);
        info!(user_id = %public.id, is_admin = public.is_admin, "logged in");
        Ok(public)
    }

    fn logout(&self, session: &mut SessionHandle) {
        if let Some(user_id) = session.session().user_id.as_deref() {
            info!(user_id, "logged out");
        }
        session.destroy();
        metrics::counter!(AUTH_LOGOUT).increment(1);
    }

    fn current_user(&self, session: &SessionHandle) -> Result<UserPublic, AppError> {
        session.session().identity().ok_or(AppError::Unauthenticated)
    }
}
