//! Domain Layer
//!
//! Order model, price parsing, and collaborator traits.

pub mod order;
pub mod price;
pub mod repository;

// Re-exports
pub use order::{Order, OrderItem, PayerData, PaymentStatus, PaymentType, StatusUpdate};
pub use repository::{CheckoutPreference, OrderRepository, PaymentProvider, PreferenceItem};
