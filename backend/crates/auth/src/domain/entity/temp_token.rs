//! Temporary Token Entity
//!
//! Short-lived credential bridging password verification and 2FA
//! verification. Consumed (deleted) exactly once, on a successful 2FA
//! check; abandoned tokens are simply left to expire.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;

/// Number of random bytes backing a temporary token
const TEMP_TOKEN_BYTES: usize = 32;

/// Temporary login token
#[derive(Debug, Clone)]
pub struct TempToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TempToken {
    /// Issue a token for a user who passed the password check but still
    /// owes a 2FA code.
    pub fn issue(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: platform::crypto::random_token(TEMP_TOKEN_BYTES),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_valid() {
        let token = TempToken::issue(UserId::new(), Duration::minutes(5));
        assert!(!token.is_expired());
        assert!(!token.token.is_empty());
    }

    #[test]
    fn test_past_ttl_is_expired() {
        let token = TempToken::issue(UserId::new(), Duration::minutes(-5));
        assert!(token.is_expired());
    }
}
