use async_trait::async_trait;
use exlibris_common::UserPublic;

use crate::error::AppError;
use crate::session::SessionHandle;
use crate::validation::{Credentials, Registration};

/// Register, login, logout and "who am I" over a credential store
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Does not log the new user in.
    async fn register(&self, registration: Registration) -> Result<UserPublic, AppError>;

    /// Verify credentials and, on success, write the identity into `session` and save it
    async fn login(
        &self,
        credentials: Credentials,
        session: &mut SessionHandle,
    ) -> Result<UserPublic, AppError>;

    /// Destroy the session. Always succeeds.
    fn logout(&self, session: &mut SessionHandle);

    /// The identity cached in the session, without a store lookup
    fn current_user(&self, session: &SessionHandle) -> Result<UserPublic, AppError>;
}
