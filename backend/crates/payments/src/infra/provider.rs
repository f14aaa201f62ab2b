//! Hosted-Checkout Provider Client
//!
//! Drives the provider's preference REST API with reqwest: one POST per
//! checkout, bearer-authenticated, returning the redirect URL the
//! customer pays at. No retry or backoff is layered on top.

use serde::{Deserialize, Serialize};

use crate::application::config::PaymentsConfig;
use crate::domain::order::PayerData;
use crate::domain::repository::{CheckoutPreference, PaymentProvider, PreferenceItem};
use crate::error::{PaymentError, PaymentResult};

/// reqwest-backed provider client
#[derive(Clone)]
pub struct HostedCheckoutClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    back_urls: BackUrls,
    notification_url: String,
    statement_descriptor: String,
    max_installments: u32,
}

impl HostedCheckoutClient {
    pub fn new(config: &PaymentsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.provider_base_url.clone(),
            access_token: config.provider_access_token.clone(),
            back_urls: BackUrls {
                success: config.success_url.clone(),
                failure: config.failure_url.clone(),
                pending: config.pending_url.clone(),
            },
            notification_url: config.notification_url.clone(),
            statement_descriptor: config.statement_descriptor.clone(),
            max_installments: config.max_installments,
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct BackUrls {
    success: String,
    failure: String,
    pending: String,
}

#[derive(Serialize)]
struct ProviderPhone<'a> {
    area_code: &'a str,
    number: &'a str,
}

#[derive(Serialize)]
struct ProviderIdentification<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    number: &'a str,
}

#[derive(Serialize)]
struct ProviderAddress<'a> {
    zip_code: &'a str,
    street_name: &'a str,
    street_number: i32,
}

#[derive(Serialize)]
struct ProviderPayer<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<ProviderPhone<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identification: Option<ProviderIdentification<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<ProviderAddress<'a>>,
}

impl<'a> ProviderPayer<'a> {
    fn from_payer(payer: &'a PayerData) -> Self {
        let phone = match (&payer.phone_area_code, &payer.phone_number) {
            (Some(area_code), Some(number)) => Some(ProviderPhone {
                area_code: area_code.as_str(),
                number: number.as_str(),
            }),
            _ => None,
        };

        let identification = payer.cpf.as_deref().map(|number| ProviderIdentification {
            kind: "CPF",
            number,
        });

        let address = match (&payer.zip_code, &payer.street_name, payer.street_number) {
            (Some(zip_code), Some(street_name), Some(street_number)) => Some(ProviderAddress {
                zip_code: zip_code.as_str(),
                street_name: street_name.as_str(),
                street_number,
            }),
            _ => None,
        };

        Self {
            name: payer.name.as_deref(),
            surname: payer.surname.as_deref(),
            email: payer.email.as_deref(),
            phone,
            identification,
            address,
        }
    }
}

#[derive(Serialize)]
struct ExcludedPaymentType<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct PaymentMethods<'a> {
    excluded_payment_types: Vec<ExcludedPaymentType<'a>>,
    installments: u32,
    default_installments: u32,
}

#[derive(Serialize)]
struct PreferenceRequest<'a> {
    items: &'a [PreferenceItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<ProviderPayer<'a>>,
    back_urls: &'a BackUrls,
    expires: bool,
    binary_mode: bool,
    external_reference: &'a str,
    notification_url: &'a str,
    operation_type: &'a str,
    payment_methods: PaymentMethods<'a>,
    statement_descriptor: &'a str,
}

#[derive(Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

// ============================================================================
// Provider implementation
// ============================================================================

impl PaymentProvider for HostedCheckoutClient {
    async fn create_preference(
        &self,
        items: &[PreferenceItem],
        payer: Option<&PayerData>,
        external_reference: &str,
    ) -> PaymentResult<CheckoutPreference> {
        let request = PreferenceRequest {
            items,
            payer: payer.map(ProviderPayer::from_payer),
            back_urls: &self.back_urls,
            expires: false,
            binary_mode: false,
            external_reference,
            notification_url: &self.notification_url,
            operation_type: "regular_payment",
            payment_methods: PaymentMethods {
                // Boleto-style tickets clear too slowly for this storefront
                excluded_payment_types: vec![ExcludedPaymentType { id: "ticket" }],
                installments: self.max_installments,
                default_installments: 1,
            },
            statement_descriptor: &self.statement_descriptor,
        };

        let url = format!("{}/checkout/preferences", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(format!(
                "preference request returned {}: {}",
                status, body
            )));
        }

        let preference: PreferenceResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Ok(CheckoutPreference {
            preference_id: preference.id,
            init_point: preference.init_point,
        })
    }
}
