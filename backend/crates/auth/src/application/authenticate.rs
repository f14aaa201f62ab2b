//! Password Authentication Use Case
//!
//! Checks the password and either opens a session directly or, when the
//! user is enrolled in 2FA, hands out a short-lived temporary token to be
//! redeemed by the 2FA verification step.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{session::Session, temp_token::TempToken, user::User};
use crate::domain::repository::{SessionRepository, TempTokenRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Password login input
pub struct AuthenticateInput {
    pub username: String,
    pub password: String,
}

/// Password login outcome
#[derive(Debug)]
pub enum AuthenticateOutput {
    /// 2FA is enabled: the caller must redeem the temp token with a code.
    /// The provisioning URI is present only until the user's first
    /// successful verification.
    TwoFactorRequired {
        temp_token: String,
        provisioning_uri: Option<String>,
    },
    /// No 2FA: a session was created directly
    SignedIn { session_token: String, user: User },
}

/// Password authentication use case
pub struct AuthenticateUseCase<U, S, T>
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

impl<U, S, T> AuthenticateUseCase<U, S, T>
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

    pub async fn execute(&self, input: AuthenticateInput) -> AuthResult<AuthenticateOutput> {
        // Lookup is case-insensitive via the canonical form
        let canonical = UserName::canonicalize(&input.username);
        let user = self
            .user_repo
            .find_by_username(&canonical)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let raw_password = ClearTextPassword::new_unchecked(input.password);
        if !user
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_enrolled() {
            let temp_token =
                TempToken::issue(user.user_id, self.config.temp_token_ttl_chrono());
            self.temp_token_repo.create_temp_token(&temp_token).await?;

            // The QR stays visible on every login until first verification
            let provisioning_uri = if user.provisioning_uri_used {
                None
            } else {
                user.provisioning_uri.clone()
            };

            tracing::info!(
                user_id = %user.user_id,
                "Password accepted, awaiting 2FA code"
            );

            return Ok(AuthenticateOutput::TwoFactorRequired {
                temp_token: temp_token.token,
                provisioning_uri,
            });
        }

        let session = Session::issue(&user, self.config.session_ttl_chrono());
        self.session_repo.create_session(&session).await?;

        tracing::info!(
            user_id = %user.user_id,
            "User signed in"
        );

        Ok(AuthenticateOutput::SignedIn {
            session_token: session.token,
            user,
        })
    }
}
