//! Checkout Use Case
//!
//! Turns a cart into a hosted-payment-page link. The order row is written
//! (PENDING) before the provider is contacted; a provider failure leaves
//! it in place, link-less, since the customer never received a way to pay.

use std::sync::Arc;

use crate::application::config::PaymentsConfig;
use crate::domain::order::{Order, OrderItem, PayerData};
use crate::domain::price::parse_localized_price;
use crate::domain::repository::{OrderRepository, PaymentProvider, PreferenceItem};
use crate::error::{PaymentError, PaymentResult};

/// One cart line as the storefront sends it; the price is still a
/// localized currency string
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub price: String,
    pub quantity: u32,
    pub image: Option<String>,
}

/// Checkout input
pub struct CheckoutInput {
    pub cart_items: Vec<CartItem>,
    pub payer_info: Option<PayerData>,
}

/// Checkout output
#[derive(Debug)]
pub struct CheckoutOutput {
    pub payment_url: String,
    pub external_reference: String,
    pub total_amount: f64,
    pub items_count: usize,
}

/// Checkout use case
pub struct CheckoutUseCase<R, P>
where
    R: OrderRepository,
    P: PaymentProvider,
{
    order_repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<PaymentsConfig>,
}

impl<R, P> CheckoutUseCase<R, P>
where
    R: OrderRepository,
    P: PaymentProvider,
{
    pub fn new(order_repo: Arc<R>, provider: Arc<P>, config: Arc<PaymentsConfig>) -> Self {
        Self {
            order_repo,
            provider,
            config,
        }
    }

    pub async fn execute(&self, input: CheckoutInput) -> PaymentResult<CheckoutOutput> {
        if input.cart_items.is_empty() {
            return Err(PaymentError::EmptyCart);
        }

        let order_items: Vec<OrderItem> = input
            .cart_items
            .iter()
            .map(|item| self.to_order_item(item))
            .collect::<PaymentResult<_>>()?;

        let total_amount: f64 = order_items.iter().map(|i| i.total_price).sum();
        let external_reference =
            Order::generate_reference(&self.config.external_reference_prefix);

        // PENDING order goes in first; it is never rolled back
        let mut order = Order::new(
            external_reference.clone(),
            order_items.clone(),
            total_amount,
            self.config.currency.clone(),
            input.payer_info.clone(),
        );
        self.order_repo.create(&order).await?;

        let preference_items: Vec<PreferenceItem> =
            order_items.iter().map(|i| self.to_preference_item(i)).collect();

        let preference = self
            .provider
            .create_preference(
                &preference_items,
                input.payer_info.as_ref(),
                &external_reference,
            )
            .await?;

        order.preference_id = Some(preference.preference_id);
        order.updated_at = chrono::Utc::now();
        self.order_repo.update(&order).await?;

        tracing::info!(
            external_reference = %external_reference,
            total_amount,
            items = order.items.len(),
            "Checkout created"
        );

        Ok(CheckoutOutput {
            payment_url: preference.init_point,
            external_reference,
            total_amount,
            items_count: order.items.len(),
        })
    }

    fn to_order_item(&self, item: &CartItem) -> PaymentResult<OrderItem> {
        let unit_price = parse_localized_price(&item.price)?;

        Ok(OrderItem {
            id: item.id.clone(),
            title: format!("{} {}", item.brand, item.model),
            description: Some(format!(
                "{} {} - Size: {}",
                item.brand, item.model, item.size
            )),
            quantity: item.quantity,
            unit_price,
            total_price: unit_price * item.quantity as f64,
            picture_url: self.picture_url(item.image.as_deref()),
        })
    }

    fn to_preference_item(&self, item: &OrderItem) -> PreferenceItem {
        PreferenceItem {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            picture_url: item.picture_url.clone(),
            category_id: "car_electronics".to_string(),
            quantity: item.quantity,
            currency_id: self.config.currency.clone(),
            unit_price: item.unit_price,
        }
    }

    fn picture_url(&self, image: Option<&str>) -> Option<String> {
        match (image, &self.config.media_base_url) {
            (Some(image), Some(base)) => Some(format!("{}/{}", base, image)),
            _ => None,
        }
    }
}
