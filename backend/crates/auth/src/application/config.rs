//! Application Configuration
//!
//! Configuration for the auth application layer. Each tenant gets its own
//! instance (own cookie name, own issuer).

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name (per tenant)
    pub session_cookie_name: String,
    /// Session TTL (30 minutes)
    pub session_ttl: Duration,
    /// Temporary 2FA token TTL (5 minutes)
    pub temp_token_ttl: Duration,
    /// Issuer shown in authenticator apps
    pub totp_issuer: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "admin_session".to_string(),
            session_ttl: Duration::from_secs(30 * 60),
            temp_token_ttl: Duration::from_secs(5 * 60),
            totp_issuer: "Backoffice".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Session TTL as chrono duration for expiry arithmetic
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or_else(|_| chrono::Duration::minutes(30))
    }

    /// Temp token TTL as chrono duration
    pub fn temp_token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.temp_token_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(5))
    }

    /// Session cookie Max-Age in seconds
    pub fn session_max_age_secs(&self) -> i64 {
        self.session_ttl.as_secs() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
