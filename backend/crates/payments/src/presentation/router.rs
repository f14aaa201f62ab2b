//! Payments Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::PaymentsConfig;
use crate::domain::repository::{OrderRepository, PaymentProvider};
use crate::infra::postgres::PgOrderRepository;
use crate::infra::provider::HostedCheckoutClient;
use crate::presentation::handlers::{self, PaymentsAppState};

/// Create the payments router with the PostgreSQL repository and the
/// hosted-checkout client
pub fn payments_router(
    orders: PgOrderRepository,
    provider: HostedCheckoutClient,
    config: PaymentsConfig,
) -> Router {
    payments_router_generic(orders, provider, config)
}

/// Create a generic payments router for any repository/provider pair
pub fn payments_router_generic<R, P>(orders: R, provider: P, config: PaymentsConfig) -> Router
where
    R: OrderRepository + Clone + Send + Sync + 'static,
    P: PaymentProvider + Clone + Send + Sync + 'static,
{
    let state = PaymentsAppState {
        orders: Arc::new(orders),
        provider: Arc::new(provider),
        config: Arc::new(config),
    };

    Router::new()
        .route("/checkout", post(handlers::create_checkout::<R, P>))
        .route("/callback", get(handlers::payment_callback::<R, P>))
        .route("/webhook", post(handlers::webhook::<R, P>))
        .route("/orders", get(handlers::list_orders::<R, P>))
        .route(
            "/orders/{external_reference}",
            get(handlers::get_order::<R, P>),
        )
        .with_state(state)
}
