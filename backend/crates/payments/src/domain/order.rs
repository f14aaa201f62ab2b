//! Order Entity
//!
//! The checkout transaction record. Created PENDING at checkout time,
//! mutated only by payment-status reconciliation, never deleted. The
//! caller-generated `external_reference` is the sole correlation key
//! between checkout creation and later provider callbacks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal payment status vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
}

impl PaymentStatus {
    /// Map the provider's status vocabulary onto the internal enum.
    ///
    /// Unrecognized values default to `Pending`: a callback is never
    /// rejected over vocabulary drift.
    pub fn from_provider(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "authorized" => Self::Authorized,
            "in_process" => Self::InProcess,
            "in_mediation" => Self::InMediation,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "charged_back" => Self::ChargedBack,
            _ => Self::Pending,
        }
    }

    /// Stored/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Authorized => "authorized",
            Self::InProcess => "in_process",
            Self::InMediation => "in_mediation",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::ChargedBack => "charged_back",
        }
    }

    /// Decode a stored value; unknown text degrades to `Pending`
    pub fn from_db(value: &str) -> Self {
        Self::from_provider(value)
    }
}

/// Payment instrument vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    CreditCard,
    DebitCard,
    BankTransfer,
    Ticket,
    DigitalWallet,
    Other,
}

impl PaymentType {
    /// Unrecognized instruments become `Other`
    pub fn from_provider(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "credit_card" => Self::CreditCard,
            "debit_card" => Self::DebitCard,
            "bank_transfer" => Self::BankTransfer,
            "ticket" => Self::Ticket,
            "digital_wallet" => Self::DigitalWallet,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::BankTransfer => "bank_transfer",
            Self::Ticket => "ticket",
            Self::DigitalWallet => "digital_wallet",
            Self::Other => "other",
        }
    }
}

/// One line of an order, with the price already parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    /// quantity x unit_price
    pub total_price: f64,
    pub picture_url: Option<String>,
}

/// Customer profile forwarded to the provider and kept with the order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayerData {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone_area_code: Option<String>,
    pub phone_number: Option<String>,
    pub cpf: Option<String>,
    pub zip_code: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<i32>,
}

/// Fields a reconciliation may carry; absent fields leave the order as-is
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub status: PaymentStatus,
    pub collection_status: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub payment_id: Option<String>,
    pub collection_id: Option<String>,
    pub merchant_order_id: Option<String>,
    pub processing_mode: Option<String>,
    pub preference_id: Option<String>,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Order entity
#[derive(Debug, Clone)]
pub struct Order {
    /// Caller-generated unique reference; doubles as the primary key
    pub external_reference: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub currency: String,
    pub payer: Option<PayerData>,
    pub payment_status: PaymentStatus,
    pub collection_status: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub preference_id: Option<String>,
    pub payment_id: Option<String>,
    pub collection_id: Option<String>,
    pub merchant_order_id: Option<String>,
    pub processing_mode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once, when the order first reaches APPROVED
    pub payment_date: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new PENDING order
    pub fn new(
        external_reference: String,
        items: Vec<OrderItem>,
        total_amount: f64,
        currency: String,
        payer: Option<PayerData>,
    ) -> Self {
        let now = Utc::now();
        Self {
            external_reference,
            items,
            total_amount,
            currency,
            payer,
            payment_status: PaymentStatus::Pending,
            collection_status: None,
            payment_type: None,
            preference_id: None,
            payment_id: None,
            collection_id: None,
            merchant_order_id: None,
            processing_mode: None,
            created_at: now,
            updated_at: now,
            payment_date: None,
        }
    }

    /// Time-based external reference; collisions are only possible for
    /// concurrent sub-second checkouts, acceptable at this volume.
    pub fn generate_reference(prefix: &str) -> String {
        format!("{}-{}", prefix, Utc::now().timestamp())
    }

    /// Apply a reconciliation. Idempotent for identical payloads apart
    /// from `updated_at`; `payment_date` is written only on the first
    /// transition to APPROVED.
    pub fn apply(&mut self, update: StatusUpdate) {
        self.payment_status = update.status;

        if update.collection_status.is_some() {
            self.collection_status = update.collection_status;
        }
        if update.payment_type.is_some() {
            self.payment_type = update.payment_type;
        }
        if update.payment_id.is_some() {
            self.payment_id = update.payment_id;
        }
        if update.collection_id.is_some() {
            self.collection_id = update.collection_id;
        }
        if update.merchant_order_id.is_some() {
            self.merchant_order_id = update.merchant_order_id;
        }
        if update.processing_mode.is_some() {
            self.processing_mode = update.processing_mode;
        }
        if update.preference_id.is_some() {
            self.preference_id = update.preference_id;
        }

        if self.payment_status == PaymentStatus::Approved && self.payment_date.is_none() {
            self.payment_date = Some(Utc::now());
        }

        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_mapping() {
        assert_eq!(
            PaymentStatus::from_provider("approved"),
            PaymentStatus::Approved
        );
        assert_eq!(
            PaymentStatus::from_provider("APPROVED"),
            PaymentStatus::Approved
        );
        assert_eq!(
            PaymentStatus::from_provider("charged_back"),
            PaymentStatus::ChargedBack
        );
        assert_eq!(
            PaymentStatus::from_provider("in_mediation"),
            PaymentStatus::InMediation
        );
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        assert_eq!(
            PaymentStatus::from_provider("something_new"),
            PaymentStatus::Pending
        );
        assert_eq!(PaymentStatus::from_provider(""), PaymentStatus::Pending);
    }

    #[test]
    fn test_status_roundtrips_through_storage() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Authorized,
            PaymentStatus::InProcess,
            PaymentStatus::InMediation,
            PaymentStatus::Rejected,
            PaymentStatus::Cancelled,
            PaymentStatus::Refunded,
            PaymentStatus::ChargedBack,
        ] {
            assert_eq!(PaymentStatus::from_db(status.as_str()), status);
        }
    }

    #[test]
    fn test_payment_type_mapping() {
        assert_eq!(
            PaymentType::from_provider("credit_card"),
            PaymentType::CreditCard
        );
        assert_eq!(PaymentType::from_provider("pix"), PaymentType::Other);
    }

    #[test]
    fn test_apply_sets_payment_date_only_on_first_approval() {
        let mut order = Order::new(
            "ORD-1700000000".to_string(),
            vec![],
            100.0,
            "BRL".to_string(),
            None,
        );
        assert!(order.payment_date.is_none());

        order.apply(StatusUpdate {
            status: PaymentStatus::Approved,
            ..Default::default()
        });
        let first_date = order.payment_date.unwrap();

        order.apply(StatusUpdate {
            status: PaymentStatus::Approved,
            ..Default::default()
        });
        assert_eq!(order.payment_date.unwrap(), first_date);
    }

    #[test]
    fn test_apply_keeps_fields_absent_from_the_update() {
        let mut order = Order::new(
            "ORD-1700000000".to_string(),
            vec![],
            100.0,
            "BRL".to_string(),
            None,
        );

        order.apply(StatusUpdate {
            status: PaymentStatus::Approved,
            payment_id: Some("pay-1".to_string()),
            collection_id: Some("col-1".to_string()),
            ..Default::default()
        });

        // A later update without those fields must not blank them
        order.apply(StatusUpdate {
            status: PaymentStatus::Approved,
            ..Default::default()
        });
        assert_eq!(order.payment_id.as_deref(), Some("pay-1"));
        assert_eq!(order.collection_id.as_deref(), Some("col-1"));
    }

    #[test]
    fn test_generate_reference_shape() {
        let reference = Order::generate_reference("ORD");
        let (prefix, timestamp) = reference.split_once('-').unwrap();
        assert_eq!(prefix, "ORD");
        assert!(timestamp.parse::<i64>().is_ok());
    }
}
