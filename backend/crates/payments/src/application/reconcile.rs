//! Payment Reconciliation Use Case
//!
//! Applies a provider redirect/webhook status to the matching order.
//! Idempotent: replaying a terminal status changes nothing but the
//! update timestamp.

use std::sync::Arc;

use crate::domain::order::{Order, PaymentStatus, PaymentType, StatusUpdate};
use crate::domain::repository::OrderRepository;
use crate::error::{PaymentError, PaymentResult};

/// Provider callback fields; everything but the reference is optional
#[derive(Debug, Clone, Default)]
pub struct ReconcileInput {
    pub external_reference: String,
    pub status: Option<String>,
    pub payment_type: Option<String>,
    pub collection_status: Option<String>,
    pub payment_id: Option<String>,
    pub collection_id: Option<String>,
    pub merchant_order_id: Option<String>,
    pub processing_mode: Option<String>,
    pub preference_id: Option<String>,
}

/// Reconciliation use case
pub struct ReconcileUseCase<R>
where
    R: OrderRepository,
{
    order_repo: Arc<R>,
}

impl<R> ReconcileUseCase<R>
where
    R: OrderRepository,
{
    pub fn new(order_repo: Arc<R>) -> Self {
        Self { order_repo }
    }

    pub async fn execute(&self, input: ReconcileInput) -> PaymentResult<Order> {
        let mut order = self
            .order_repo
            .find_by_reference(&input.external_reference)
            .await?
            .ok_or(PaymentError::OrderNotFound)?;

        // Missing or unknown provider status degrades to PENDING
        let status = input
            .status
            .as_deref()
            .map(PaymentStatus::from_provider)
            .unwrap_or(PaymentStatus::Pending);

        let payment_type = input.payment_type.as_deref().map(PaymentType::from_provider);

        order.apply(StatusUpdate {
            status,
            collection_status: input.collection_status,
            payment_type,
            payment_id: input.payment_id,
            collection_id: input.collection_id,
            merchant_order_id: input.merchant_order_id,
            processing_mode: input.processing_mode,
            preference_id: input.preference_id,
        });

        self.order_repo.update(&order).await?;

        tracing::info!(
            external_reference = %order.external_reference,
            status = status.as_str(),
            "Order reconciled"
        );

        Ok(order)
    }
}
