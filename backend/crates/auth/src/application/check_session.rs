//! Check Session Use Case
//!
//! Resolves a session cookie to its user. A missing, expired, or
//! version-stale session yields `None`, never an error; only storage
//! failures propagate.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Resolve a session token to its user.
    ///
    /// Stale rows (expired, orphaned, or superseded by a session_version
    /// bump) are deleted on read.
    pub async fn execute(&self, token: &str) -> AuthResult<Option<User>> {
        let session = match self.session_repo.find_session(token).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo.delete_session(token).await?;
            return Ok(None);
        }

        let user = match self.user_repo.find_by_id(&session.user_id).await? {
            Some(u) => u,
            None => {
                self.session_repo.delete_session(token).await?;
                return Ok(None);
            }
        };

        // Disabling 2FA bumps the user's version; older sessions die here
        if !session.matches_version(&user) {
            tracing::debug!(
                user_id = %user.user_id,
                "Session superseded by a session_version bump"
            );
            self.session_repo.delete_session(token).await?;
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve the session and require an administrator.
    ///
    /// `SessionInvalid` without a valid session, `AdminRequired` when the
    /// session's user lacks the privilege.
    pub async fn require_admin(&self, token: &str) -> AuthResult<User> {
        let user = self
            .execute(token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !user.is_admin {
            return Err(AuthError::AdminRequired);
        }

        Ok(user)
    }
}
