//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::order::{Order, OrderItem, PayerData, PaymentStatus, PaymentType};
use crate::domain::repository::OrderRepository;
use crate::error::PaymentResult;

/// PostgreSQL-backed order repository
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> PaymentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                external_reference,
                items,
                total_amount,
                currency,
                payer,
                payment_status,
                collection_status,
                payment_type,
                preference_id,
                payment_id,
                collection_id,
                merchant_order_id,
                processing_mode,
                created_at,
                updated_at,
                payment_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&order.external_reference)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(order.payer.as_ref().map(Json))
        .bind(order.payment_status.as_str())
        .bind(&order.collection_status)
        .bind(order.payment_type.map(|t| t.as_str()))
        .bind(&order.preference_id)
        .bind(&order.payment_id)
        .bind(&order.collection_id)
        .bind(&order.merchant_order_id)
        .bind(&order.processing_mode)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.payment_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_reference(&self, external_reference: &str) -> PaymentResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT
                external_reference,
                items,
                total_amount,
                currency,
                payer,
                payment_status,
                collection_status,
                payment_type,
                preference_id,
                payment_id,
                collection_id,
                merchant_order_id,
                processing_mode,
                created_at,
                updated_at,
                payment_date
            FROM orders
            WHERE external_reference = $1
            "#,
        )
        .bind(external_reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_order()))
    }

    async fn update(&self, order: &Order) -> PaymentResult<()> {
        sqlx::query(
            r#"
            UPDATE orders SET
                items = $2,
                total_amount = $3,
                currency = $4,
                payer = $5,
                payment_status = $6,
                collection_status = $7,
                payment_type = $8,
                preference_id = $9,
                payment_id = $10,
                collection_id = $11,
                merchant_order_id = $12,
                processing_mode = $13,
                updated_at = $14,
                payment_date = $15
            WHERE external_reference = $1
            "#,
        )
        .bind(&order.external_reference)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(order.payer.as_ref().map(Json))
        .bind(order.payment_status.as_str())
        .bind(&order.collection_status)
        .bind(order.payment_type.map(|t| t.as_str()))
        .bind(&order.preference_id)
        .bind(&order.payment_id)
        .bind(&order.collection_id)
        .bind(&order.merchant_order_id)
        .bind(&order.processing_mode)
        .bind(order.updated_at)
        .bind(order.payment_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, skip: i64, limit: i64) -> PaymentResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT
                external_reference,
                items,
                total_amount,
                currency,
                payer,
                payment_status,
                collection_status,
                payment_type,
                preference_id,
                payment_id,
                collection_id,
                merchant_order_id,
                processing_mode,
                created_at,
                updated_at,
                payment_date
            FROM orders
            ORDER BY created_at DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_order()).collect())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct OrderRow {
    external_reference: String,
    items: Json<Vec<OrderItem>>,
    total_amount: f64,
    currency: String,
    payer: Option<Json<PayerData>>,
    payment_status: String,
    collection_status: Option<String>,
    payment_type: Option<String>,
    preference_id: Option<String>,
    payment_id: Option<String>,
    collection_id: Option<String>,
    merchant_order_id: Option<String>,
    processing_mode: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    payment_date: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self) -> Order {
        Order {
            external_reference: self.external_reference,
            items: self.items.0,
            total_amount: self.total_amount,
            currency: self.currency,
            payer: self.payer.map(|p| p.0),
            payment_status: PaymentStatus::from_db(&self.payment_status),
            collection_status: self.collection_status,
            payment_type: self.payment_type.as_deref().map(PaymentType::from_provider),
            preference_id: self.preference_id,
            payment_id: self.payment_id,
            collection_id: self.collection_id,
            merchant_order_id: self.merchant_order_id,
            processing_mode: self.processing_mode,
            created_at: self.created_at,
            updated_at: self.updated_at,
            payment_date: self.payment_date,
        }
    }
}
