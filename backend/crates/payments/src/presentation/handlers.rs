//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::config::PaymentsConfig;
use crate::application::webhook::process_notification;
use crate::application::{CartItem, CheckoutInput, CheckoutUseCase, ReconcileInput, ReconcileUseCase};
use crate::domain::repository::{OrderRepository, PaymentProvider};
use crate::error::{PaymentError, PaymentResult};
use crate::presentation::dto::{
    CallbackParams, CallbackResponse, CheckoutRequest, CheckoutResponse, OrderListQuery,
    OrderOut, OrderResponse, OrdersResponse, WebhookAck,
};

/// Shared state for payments handlers
#[derive(Clone)]
pub struct PaymentsAppState<R, P>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    pub orders: Arc<R>,
    pub provider: Arc<P>,
    pub config: Arc<PaymentsConfig>,
}

/// POST /checkout
pub async fn create_checkout<R, P>(
    State(state): State<PaymentsAppState<R, P>>,
    Json(req): Json<CheckoutRequest>,
) -> PaymentResult<Json<CheckoutResponse>>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    let use_case = CheckoutUseCase::new(
        state.orders.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let cart_items = req
        .cart_items
        .into_iter()
        .map(|item| CartItem {
            id: item.id,
            brand: item.brand,
            model: item.model,
            size: item.size,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
        })
        .collect();

    let output = use_case
        .execute(CheckoutInput {
            cart_items,
            payer_info: req.payer_info.map(Into::into),
        })
        .await?;

    Ok(Json(CheckoutResponse {
        success: true,
        payment_url: output.payment_url,
        total_amount: output.total_amount,
        items_count: output.items_count,
        external_reference: output.external_reference,
        message: "Payment link created".to_string(),
    }))
}

/// GET /callback
///
/// Provider redirect target; updates the matching order from the query
/// parameters.
pub async fn payment_callback<R, P>(
    State(state): State<PaymentsAppState<R, P>>,
    Query(params): Query<CallbackParams>,
) -> PaymentResult<Json<CallbackResponse>>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    let external_reference = params
        .external_reference
        .ok_or(PaymentError::MissingReference)?;

    let use_case = ReconcileUseCase::new(state.orders.clone());
    let order = use_case
        .execute(ReconcileInput {
            external_reference,
            status: params.status,
            payment_type: params.payment_type,
            collection_status: params.collection_status,
            payment_id: params.payment_id,
            collection_id: params.collection_id,
            merchant_order_id: params.merchant_order_id,
            processing_mode: params.processing_mode,
            preference_id: params.preference_id,
        })
        .await?;

    Ok(Json(CallbackResponse {
        success: true,
        message: "Order updated".to_string(),
        external_reference: order.external_reference.clone(),
        status: order.payment_status.as_str().to_string(),
    }))
}

/// POST /webhook
///
/// Always acknowledges with 200: webhook senders must never be pushed
/// into a retry storm by an internal failure. The body is taken as raw
/// bytes so even malformed JSON gets its acknowledgement.
pub async fn webhook<R, P>(
    State(_state): State<PaymentsAppState<R, P>>,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>)
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    process_notification(&body);

    (
        StatusCode::OK,
        Json(WebhookAck {
            status: "received".to_string(),
        }),
    )
}

/// GET /orders
pub async fn list_orders<R, P>(
    State(state): State<PaymentsAppState<R, P>>,
    Query(query): Query<OrderListQuery>,
) -> PaymentResult<Json<OrdersResponse>>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    let orders = state.orders.list(query.skip, query.limit).await?;

    let orders: Vec<OrderOut> = orders.iter().map(OrderOut::from).collect();
    let total = orders.len();

    Ok(Json(OrdersResponse {
        success: true,
        orders,
        total,
    }))
}

/// GET /orders/{external_reference}
pub async fn get_order<R, P>(
    State(state): State<PaymentsAppState<R, P>>,
    Path(external_reference): Path<String>,
) -> PaymentResult<Json<OrderResponse>>
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    let order = state
        .orders
        .find_by_reference(&external_reference)
        .await?
        .ok_or(PaymentError::OrderNotFound)?;

    Ok(Json(OrderResponse {
        success: true,
        order: OrderOut::from(&order),
    }))
}
