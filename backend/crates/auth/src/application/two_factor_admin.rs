//! 2FA Enrollment Administration Use Case
//!
//! Enroll a user in TOTP, inspect enrollment state, and disable 2FA.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// TOTP setup outcome
pub enum TotpSetupOutput {
    /// An existing secret is never rotated through this path
    AlreadyEnrolled,
    Enrolled {
        /// Base32 secret for manual entry
        secret: String,
        /// otpauth:// URL
        provisioning_uri: String,
        /// QR code as a PNG data URL
        qr_code: String,
    },
}

/// 2FA administration use case
pub struct TwoFactorAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> TwoFactorAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Whether the user currently has a TOTP secret
    pub async fn status(&self, user_id: &UserId) -> AuthResult<bool> {
        let user = self.user_repo.find_by_id(user_id).await?;
        Ok(user.map(|u| u.is_enrolled()).unwrap_or(false))
    }

    /// Enroll a user in TOTP.
    ///
    /// No-ops when a secret already exists.
    pub async fn setup(&self, user_id: &UserId) -> AuthResult<TotpSetupOutput> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_enrolled() {
            return Ok(TotpSetupOutput::AlreadyEnrolled);
        }

        let enrollment = user
            .enroll_totp(&self.config.totp_issuer)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let qr_code = enrollment
            .secret
            .qr_data_url(&user.totp_account_name(), &self.config.totp_issuer)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user_id,
            "TOTP enrollment created"
        );

        Ok(TotpSetupOutput::Enrolled {
            secret: enrollment.secret.as_base32().to_string(),
            provisioning_uri: enrollment.provisioning_uri,
            qr_code,
        })
    }

    /// Disable 2FA, recording the reason and invalidating open sessions
    /// through the session_version bump.
    pub async fn disable(&self, user_id: &UserId, reason: Option<String>) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.disable_totp(reason);
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user_id,
            "TOTP disabled"
        );

        Ok(())
    }
}
