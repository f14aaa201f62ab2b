//! Repository and Collaborator Traits
//!
//! Interfaces for order persistence and the hosted-checkout provider.
//! Implementations live in the infrastructure layer.

use serde::Serialize;

use crate::domain::order::{Order, PayerData};
use crate::error::PaymentResult;

/// Order repository trait
#[trait_variant::make(OrderRepository: Send)]
pub trait LocalOrderRepository {
    /// Persist a new order
    async fn create(&self, order: &Order) -> PaymentResult<()>;

    /// Find an order by its external reference
    async fn find_by_reference(&self, external_reference: &str) -> PaymentResult<Option<Order>>;

    /// Update an order (reconciliation writes)
    async fn update(&self, order: &Order) -> PaymentResult<()>;

    /// List orders, newest first
    async fn list(&self, skip: i64, limit: i64) -> PaymentResult<Vec<Order>>;
}

/// One item in the provider's preference request
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    pub category_id: String,
    pub quantity: u32,
    pub currency_id: String,
    pub unit_price: f64,
}

/// A created hosted-checkout preference
#[derive(Debug, Clone)]
pub struct CheckoutPreference {
    pub preference_id: String,
    /// Redirect URL the customer pays at
    pub init_point: String,
}

/// Hosted-checkout provider collaborator.
///
/// Calls are best-effort: no retry or backoff is layered on top, and a
/// failure leaves the already-persisted PENDING order in place.
#[trait_variant::make(PaymentProvider: Send)]
pub trait LocalPaymentProvider {
    async fn create_preference(
        &self,
        items: &[PreferenceItem],
        payer: Option<&PayerData>,
        external_reference: &str,
    ) -> PaymentResult<CheckoutPreference>;
}
