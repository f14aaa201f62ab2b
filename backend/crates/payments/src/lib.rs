//! Payments Backend Module
//!
//! Checkout and payment-status reconciliation for the e-commerce tenant:
//! - `domain/` - Order model, status vocabulary, localized price parsing
//! - `application/` - Checkout, reconciliation, webhook processing
//! - `infra/` - Order persistence, hosted-checkout provider client
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Flow
//! A checkout parses the cart's localized prices, persists a PENDING
//! order keyed by a generated external reference, and asks the provider
//! for a hosted payment page. The provider later reports the outcome via
//! a redirect (`GET /callback`) and an asynchronous webhook; the order is
//! reconciled from the redirect parameters, idempotently, and webhook
//! deliveries are always acknowledged with 200.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::PaymentsConfig;
pub use error::{PaymentError, PaymentResult};
pub use infra::postgres::PgOrderRepository;
pub use infra::provider::HostedCheckoutClient;
pub use presentation::router::{payments_router, payments_router_generic};
