//! Logout Use Case
//!
//! Deletes the session row unconditionally. Idempotent: logging out an
//! unknown or already-deleted token succeeds.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        self.session_repo.delete_session(token).await?;
        tracing::info!("User signed out");
        Ok(())
    }
}
