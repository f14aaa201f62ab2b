//! Infrastructure Layer
//!
//! Database implementation and the payment-provider client.

pub mod postgres;
pub mod provider;

pub use postgres::PgOrderRepository;
pub use provider::HostedCheckoutClient;
