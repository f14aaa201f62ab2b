//! Localized Price Parsing
//!
//! Storefront prices arrive as Brazilian-format currency strings
//! ("R$ 1.250,00"): dot as thousands separator, comma as the decimal
//! mark. Parsing strips the currency symbol, drops the thousands dots,
//! then swaps the decimal comma for a dot before the float conversion.
//! The order matters: dots must go before the comma becomes one.

use crate::error::PaymentError;

/// Parse a localized currency string into a float amount.
///
/// Accepts the bare number forms too ("299,90", "1.250,00").
pub fn parse_localized_price(raw: &str) -> Result<f64, PaymentError> {
    let trimmed = raw.trim();
    let without_symbol = trimmed
        .strip_prefix("R$")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let normalized = without_symbol.replace('.', "").replace(',', ".");

    normalized
        .parse::<f64>()
        .map_err(|_| PaymentError::InvalidPrice(raw.to_string()))
}
