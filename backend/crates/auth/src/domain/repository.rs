//! Repository Traits
//!
//! Interfaces for data persistence and outbound collaborators.
//! Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::{
    access_record::{AccessRecord, GeoLocation},
    session::Session,
    temp_token::TempToken,
    user::User,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by canonical (lowercase) username
    async fn find_by_username(&self, canonical: &str) -> AuthResult<Option<User>>;

    /// Check if a canonical username exists
    async fn exists_by_username(&self, canonical: &str) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete user; returns false when no such user exists
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;

    /// List all users
    async fn list(&self) -> AuthResult<Vec<User>>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new session
    async fn create_session(&self, session: &Session) -> AuthResult<()>;

    /// Find a session by its opaque token. Expiry is NOT filtered here;
    /// callers check it so that stale rows can be deleted on read.
    async fn find_session(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Delete a session; idempotent
    async fn delete_session(&self, token: &str) -> AuthResult<()>;

    /// Sweep expired sessions (startup housekeeping)
    async fn cleanup_expired_sessions(&self) -> AuthResult<u64>;
}

/// Temporary token repository trait
#[trait_variant::make(TempTokenRepository: Send)]
pub trait LocalTempTokenRepository {
    /// Persist a new temporary token
    async fn create_temp_token(&self, token: &TempToken) -> AuthResult<()>;

    /// Find a temporary token. Expiry is checked by the caller.
    async fn find_temp_token(&self, token: &str) -> AuthResult<Option<TempToken>>;

    /// Delete a temporary token (consume it)
    async fn delete_temp_token(&self, token: &str) -> AuthResult<()>;

    /// Sweep expired temporary tokens (startup housekeeping)
    async fn cleanup_expired_temp_tokens(&self) -> AuthResult<u64>;
}

/// Access statistics repository trait
#[trait_variant::make(AccessStatsRepository: Send)]
pub trait LocalAccessStatsRepository {
    /// Store an access record
    async fn create_access_record(&self, record: &AccessRecord) -> AuthResult<()>;

    /// List access records, newest first, optionally bounded by timestamps
    async fn list_access_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AuthResult<Vec<AccessRecord>>;

    /// Delete all access records
    async fn clear_access_records(&self) -> AuthResult<u64>;
}

/// Geolocation lookup collaborator.
///
/// Failures are advisory: callers store the record without a location
/// rather than propagating the error.
#[trait_variant::make(GeoResolver: Send)]
pub trait LocalGeoResolver {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError>;
}

/// Geolocation lookup errors
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Geolocation request failed: {0}")]
    Http(String),

    #[error("Geolocation unavailable: {0}")]
    Unavailable(String),
}
