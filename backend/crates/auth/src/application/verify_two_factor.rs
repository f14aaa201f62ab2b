//! 2FA Verification Use Case
//!
//! Redeems a temporary token issued by the password step. On success the
//! temp token is consumed, the provisioning QR is marked used, and a
//! session is created.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, TempTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// 2FA verification output
#[derive(Debug)]
pub struct VerifyTwoFactorOutput {
    pub session_token: String,
    pub user: User,
}

/// 2FA verification use case
pub struct VerifyTwoFactorUseCase<U, S, T>
where
    U: UserRepository,
    S: SessionRepository,
    T: TempTokenRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    temp_token_repo: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<U, S, T> VerifyTwoFactorUseCase<U, S, T>
where
    U: UserRepository,
    S: SessionRepository,
    T: TempTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        temp_token_repo: Arc<T>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            temp_token_repo,
            config,
        }
    }

    pub async fn execute(&self, temp_token: &str, code: &str) -> AuthResult<VerifyTwoFactorOutput> {
        let token = self
            .temp_token_repo
            .find_temp_token(temp_token)
            .await?
            .ok_or(AuthError::TempTokenInvalid)?;

        // Expiry is lazy: an expired row is as good as absent. Failed or
        // abandoned attempts leave the token to expire on its own.
        if token.is_expired() {
            return Err(AuthError::TempTokenInvalid);
        }

        let mut user = self
            .user_repo
            .find_by_id(&token.user_id)
            .await?
            .ok_or(AuthError::TempTokenInvalid)?;

        let secret = user
            .totp_secret
            .as_ref()
            .ok_or(AuthError::TwoFactorNotSetup)?;

        let valid = secret
            .verify(code, &user.totp_account_name(), &self.config.totp_issuer)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        // First successful verification consumes the QR; idempotent
        if !user.provisioning_uri_used {
            user.mark_provisioning_used();
            self.user_repo.update(&user).await?;
        }

        // Consumed exactly once
        self.temp_token_repo.delete_temp_token(temp_token).await?;

        let session = Session::issue(&user, self.config.session_ttl_chrono());
        self.session_repo.create_session(&session).await?;

        tracing::info!(
            user_id = %user.user_id,
            "2FA verified, user signed in"
        );

        Ok(VerifyTwoFactorOutput {
            session_token: session.token,
            user,
        })
    }
}
