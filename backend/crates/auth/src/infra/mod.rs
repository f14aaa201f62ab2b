//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod geo;
pub mod postgres;

pub use geo::HttpGeoResolver;
pub use postgres::PgAuthRepository;
