//! TOTP Secret Value Object
//!
//! Wraps a TOTP secret for two-factor authentication.
//! Uses Google Authenticator compatible settings.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

/// TOTP configuration constants
const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
/// Accept codes from the adjacent time step in either direction (clock drift)
const TOTP_SKEW: u8 = 1;

/// TOTP Secret for two-factor authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random TOTP secret
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from database)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    /// Create a TOTP instance for this secret
    fn to_totp(&self, account_name: &str, issuer: &str) -> AppResult<TOTP> {
        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret
                .to_bytes()
                .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?,
            Some(issuer.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Verify a TOTP code against the current time step (± one step)
    pub fn verify(&self, code: &str, account_name: &str, issuer: &str) -> AppResult<bool> {
        let totp = self.to_totp(account_name, issuer)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    /// Generate current TOTP code (for testing)
    #[cfg(test)]
    pub fn generate_current(&self, account_name: &str, issuer: &str) -> AppResult<String> {
        let totp = self.to_totp(account_name, issuer)?;
        totp.generate_current()
            .map_err(|e| AppError::internal(format!("Failed to generate TOTP: {}", e)))
    }

    /// Generate a code for an arbitrary unix timestamp (for testing windows)
    #[cfg(test)]
    pub fn generate_at(&self, account_name: &str, issuer: &str, time: u64) -> AppResult<String> {
        let totp = self.to_totp(account_name, issuer)?;
        Ok(totp.generate(time))
    }

    /// The otpauth:// provisioning URI for enrollment QR codes
    pub fn provisioning_uri(&self, account_name: &str, issuer: &str) -> AppResult<String> {
        let totp = self.to_totp(account_name, issuer)?;
        Ok(totp.get_url())
    }

    /// QR code for the provisioning URI, as a PNG data URL
    pub fn qr_data_url(&self, account_name: &str, issuer: &str) -> AppResult<String> {
        let totp = self.to_totp(account_name, issuer)?;
        let png_base64 = totp
            .get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to generate QR code: {}", e)))?;
        Ok(format!("data:image/png;base64,{}", png_base64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "Backoffice";

    #[test]
    fn test_totp_secret_generate() {
        let secret = TotpSecret::generate();
        assert!(!secret.as_base32().is_empty());
    }

    #[test]
    fn test_totp_secret_verify() {
        let secret = TotpSecret::generate();
        let account = "admin@example.com";

        let code = secret.generate_current(account, ISSUER).unwrap();
        assert!(secret.verify(&code, account, ISSUER).unwrap());

        assert!(!secret.verify("000000", account, ISSUER).unwrap());
    }

    #[test]
    fn test_totp_window_accepts_adjacent_steps() {
        use std::time::{SystemTime, UNIX_EPOCH};

        let secret = TotpSecret::generate();
        let account = "admin@example.com";
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Codes from the previous and next 30s step are accepted
        let previous = secret.generate_at(account, ISSUER, now - 30).unwrap();
        assert!(secret.verify(&previous, account, ISSUER).unwrap());

        let next = secret.generate_at(account, ISSUER, now + 30).unwrap();
        assert!(secret.verify(&next, account, ISSUER).unwrap());

        // A code from two steps before the window may only pass while the
        // current code happens to collide, which it will not
        let stale = secret.generate_at(account, ISSUER, now - 120).unwrap();
        let current = secret.generate_current(account, ISSUER).unwrap();
        if stale != current {
            assert!(!secret.verify(&stale, account, ISSUER).unwrap());
        }
    }

    #[test]
    fn test_totp_secret_from_base32() {
        let secret = TotpSecret::generate();
        let base32 = secret.as_base32().to_string();

        let restored = TotpSecret::from_base32(base32).unwrap();
        assert_eq!(secret.as_base32(), restored.as_base32());
    }

    #[test]
    fn test_provisioning_uri_scheme() {
        let secret = TotpSecret::generate();
        let uri = secret.provisioning_uri("admin", ISSUER).unwrap();
        assert!(uri.starts_with("otpauth://totp/"));
        assert!(uri.contains("Backoffice"));
    }

    #[test]
    fn test_qr_data_url() {
        let secret = TotpSecret::generate();
        let qr = secret.qr_data_url("admin@example.com", ISSUER).unwrap();
        assert!(qr.starts_with("data:image/png;base64,"));
    }
}
