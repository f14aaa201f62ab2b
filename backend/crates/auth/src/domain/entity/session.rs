//! Session Entity
//!
//! Server-side record correlating an opaque cookie value to an
//! authenticated user, with absolute expiry. Expiry is lazy: a session
//! past its expiry is treated as nonexistent wherever it is read,
//! regardless of when the row is physically deleted.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;

use crate::domain::entity::user::User;

/// Number of random bytes backing a session token
const SESSION_TOKEN_BYTES: usize = 32;

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque URL-safe token; doubles as the cookie value and primary key
    pub token: String,
    pub user_id: UserId,
    /// The user's session_version at creation time; a later bump on the
    /// user invalidates this session
    pub session_version: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a new session for a user.
    ///
    /// TTL is provided by the application layer (config), not hard-coded
    /// here.
    pub fn issue(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: platform::crypto::random_token(SESSION_TOKEN_BYTES),
            user_id: user.user_id,
            session_version: user.session_version,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check that the session still matches the user's current version
    pub fn matches_version(&self, user: &User) -> bool {
        self.session_version == user.session_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_name::UserName;
    use platform::password::ClearTextPassword;

    fn test_user() -> User {
        let hash = ClearTextPassword::new_unchecked("admin123".to_string())
            .hash(None)
            .unwrap();
        User::new(UserName::new("admin").unwrap(), None, hash, None)
    }

    #[test]
    fn test_issue_fresh_session() {
        let user = test_user();
        let session = Session::issue(&user, Duration::minutes(30));
        assert!(!session.is_expired());
        assert!(session.matches_version(&user));
        assert_eq!(session.user_id, user.user_id);
        assert!(!session.token.is_empty());
    }

    #[test]
    fn test_expired_session() {
        let user = test_user();
        let session = Session::issue(&user, Duration::minutes(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_version_mismatch_after_disable() {
        let mut user = test_user();
        user.enroll_totp("Backoffice").unwrap();
        let session = Session::issue(&user, Duration::minutes(30));

        user.disable_totp(None);
        assert!(!session.matches_version(&user));
    }

    #[test]
    fn test_tokens_are_unique() {
        let user = test_user();
        let a = Session::issue(&user, Duration::minutes(30));
        let b = Session::issue(&user, Duration::minutes(30));
        assert_ne!(a.token, b.token);
    }
}
