//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{session::Session, temp_token::TempToken, user::User};
pub use repository::{
    AccessStatsRepository, GeoResolver, SessionRepository, TempTokenRepository, UserRepository,
};
