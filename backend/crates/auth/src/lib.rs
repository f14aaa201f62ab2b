//! Auth (Session & Credential) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and outbound-service implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Password login over durable, expiry-bearing server-side sessions
//! - TOTP-based 2FA with a temp-token handshake between the password and
//!   code steps (Google Authenticator compatible)
//! - Admin-gated user management with 2FA enrollment toggles
//! - Access statistics with best-effort geolocation
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (salted; optional pepper)
//! - Sessions are opaque random tokens, valid only while unexpired and
//!   while the user's session_version is unchanged
//! - Temporary 2FA tokens expire after five minutes and are consumed on
//!   first successful verification

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::geo::HttpGeoResolver;
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
