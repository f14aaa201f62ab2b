//! Application Configuration
//!
//! Configuration for the payments application layer.

/// Payments application configuration
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// Provider REST API base, e.g. `https://api.mercadopago.com`
    pub provider_base_url: String,
    /// Provider access token (bearer)
    pub provider_access_token: String,
    /// Where the customer lands after paying
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
    /// Where the provider POSTs asynchronous notifications
    pub notification_url: String,
    /// Text shown on the customer's card statement
    pub statement_descriptor: String,
    /// Prefix for generated external references
    pub external_reference_prefix: String,
    /// Currency for all items
    pub currency: String,
    /// Base URL prepended to relative item image paths
    pub media_base_url: Option<String>,
    /// Installment ceiling offered at checkout
    pub max_installments: u32,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "https://api.mercadopago.com".to_string(),
            provider_access_token: String::new(),
            success_url: "http://localhost/store/sucesso".to_string(),
            failure_url: "http://localhost/store/falha".to_string(),
            pending_url: "http://localhost/store/pendente".to_string(),
            notification_url: "http://localhost/api/store/webhook".to_string(),
            statement_descriptor: "AutoCenter".to_string(),
            external_reference_prefix: "ORD".to_string(),
            currency: "BRL".to_string(),
            media_base_url: None,
            max_installments: 12,
        }
    }
}

impl PaymentsConfig {
    /// Create config for development
    pub fn development() -> Self {
        Self::default()
    }
}
