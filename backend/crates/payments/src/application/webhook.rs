//! Webhook Notification Processing
//!
//! The provider retries aggressively on anything but a 200-class answer,
//! so processing never fails: malformed bodies and unexpected shapes are
//! logged and acknowledged.

use serde_json::Value;

/// Handle one webhook body. Extracts the payment id from
/// `{type: "payment", data: {id}}` notifications; everything else is
/// logged and ignored.
pub fn process_notification(body: &[u8]) {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook body is not valid JSON, acknowledging anyway");
            return;
        }
    };

    tracing::debug!(payload = %payload, "Webhook received");

    if payload.get("type").and_then(Value::as_str) == Some("payment") {
        match payload.pointer("/data/id") {
            Some(id) => {
                tracing::info!(payment_id = %id, "Payment notification received");
            }
            None => {
                tracing::warn!("Payment notification without data.id");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_notification() {
        process_notification(br#"{"type":"payment","data":{"id":"12345"}}"#);
    }

    #[test]
    fn test_numeric_payment_id() {
        process_notification(br#"{"type":"payment","data":{"id":12345}}"#);
    }

    #[test]
    fn test_other_notification_types_ignored() {
        process_notification(br#"{"type":"merchant_order","data":{"id":"1"}}"#);
    }

    #[test]
    fn test_malformed_bodies_never_panic() {
        process_notification(b"not json at all");
        process_notification(b"");
        process_notification(br#"{"type":"payment"}"#);
    }
}
