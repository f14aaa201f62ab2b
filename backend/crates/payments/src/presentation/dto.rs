//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderItem, PayerData};

// ============================================================================
// Checkout
// ============================================================================

/// One cart line as the storefront sends it
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemDto {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub size: String,
    /// Localized currency string, e.g. "R$ 299,90"
    pub price: String,
    pub quantity: u32,
    pub image: Option<String>,
}

/// Customer details for the hosted payment page
#[derive(Debug, Clone, Deserialize)]
pub struct PayerInfoDto {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default = "default_area_code")]
    pub phone_area_code: String,
    pub phone_number: String,
    pub cpf: String,
    pub zip_code: String,
    pub street_name: String,
    pub street_number: i32,
}

fn default_area_code() -> String {
    "11".to_string()
}

impl From<PayerInfoDto> for PayerData {
    fn from(dto: PayerInfoDto) -> Self {
        Self {
            name: Some(dto.name),
            surname: Some(dto.surname),
            email: Some(dto.email),
            phone_area_code: Some(dto.phone_area_code),
            phone_number: Some(dto.phone_number),
            cpf: Some(dto.cpf),
            zip_code: Some(dto.zip_code),
            street_name: Some(dto.street_name),
            street_number: Some(dto.street_number),
        }
    }
}

/// Checkout request
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub cart_items: Vec<CartItemDto>,
    pub payer_info: Option<PayerInfoDto>,
}

/// Checkout response
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub payment_url: String,
    pub total_amount: f64,
    pub items_count: usize,
    pub external_reference: String,
    pub message: String,
}

// ============================================================================
// Callback
// ============================================================================

/// Query parameters of the provider redirect
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub collection_id: Option<String>,
    pub collection_status: Option<String>,
    pub payment_id: Option<String>,
    pub status: Option<String>,
    pub external_reference: Option<String>,
    pub payment_type: Option<String>,
    pub merchant_order_id: Option<String>,
    pub preference_id: Option<String>,
    pub site_id: Option<String>,
    pub processing_mode: Option<String>,
}

/// Callback response
#[derive(Debug, Clone, Serialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
    pub external_reference: String,
    pub status: String,
}

// ============================================================================
// Orders
// ============================================================================

/// Public view of an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderOut {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub currency: String,
    pub payer: Option<PayerData>,
    pub payment_status: String,
    pub collection_status: Option<String>,
    pub payment_type: Option<String>,
    pub preference_id: Option<String>,
    pub payment_id: Option<String>,
    pub collection_id: Option<String>,
    pub merchant_order_id: Option<String>,
    pub processing_mode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderOut {
    fn from(order: &Order) -> Self {
        Self {
            id: order.external_reference.clone(),
            items: order.items.clone(),
            total_amount: order.total_amount,
            currency: order.currency.clone(),
            payer: order.payer.clone(),
            payment_status: order.payment_status.as_str().to_string(),
            collection_status: order.collection_status.clone(),
            payment_type: order.payment_type.map(|t| t.as_str().to_string()),
            preference_id: order.preference_id.clone(),
            payment_id: order.payment_id.clone(),
            collection_id: order.collection_id.clone(),
            merchant_order_id: order.merchant_order_id.clone(),
            processing_mode: order.processing_mode.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            payment_date: order.payment_date,
        }
    }
}

/// Order list pagination
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Order list response
#[derive(Debug, Clone, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderOut>,
    pub total: usize,
}

/// Single order response
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderOut,
}

/// Webhook acknowledgement; always sent, whatever happened inside
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: String,
}
