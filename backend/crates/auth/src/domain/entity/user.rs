//! User Entity
//!
//! A collaborator account on an admin surface. Carries both the login
//! credential (Argon2id hash) and the two-factor enrollment state.

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{totp_secret::TotpSecret, user_name::UserName};

/// Two-factor enrollment state, derived from the stored fields.
///
/// `PendingFirstVerification` keeps the provisioning QR visible at login
/// until the first successful code verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaState {
    NoMfa,
    PendingFirstVerification,
    Verified,
}

/// Result of a fresh TOTP enrollment
pub struct TotpEnrollment {
    pub secret: TotpSecret,
    pub provisioning_uri: String,
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: UserName,
    pub email: Option<String>,
    /// Argon2id PHC string
    pub password_hash: HashedPassword,
    /// Free-form job label ("medico", "recepcionista", ...)
    pub role: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    /// TOTP secret, present from enrollment until disable
    pub totp_secret: Option<TotpSecret>,
    /// otpauth:// URI generated at enrollment
    pub provisioning_uri: Option<String>,
    /// Whether the QR has been consumed by a successful verification
    pub provisioning_uri_used: bool,
    /// Bumped on 2FA disable; sessions created earlier become invalid
    pub session_version: i32,
    pub mfa_disabled_at: Option<DateTime<Utc>>,
    pub mfa_disabled_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new (non-admin, active) user
    pub fn new(
        username: UserName,
        email: Option<String>,
        password_hash: HashedPassword,
        role: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            username,
            email,
            password_hash,
            role,
            is_admin: false,
            is_active: true,
            totp_secret: None,
            provisioning_uri: None,
            provisioning_uri_used: false,
            session_version: 0,
            mfa_disabled_at: None,
            mfa_disabled_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this account may sign in at all
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Whether a TOTP secret is present
    pub fn is_enrolled(&self) -> bool {
        self.totp_secret.is_some()
    }

    /// Current two-factor state
    pub fn mfa_state(&self) -> MfaState {
        match (&self.totp_secret, self.provisioning_uri_used) {
            (None, _) => MfaState::NoMfa,
            (Some(_), false) => MfaState::PendingFirstVerification,
            (Some(_), true) => MfaState::Verified,
        }
    }

    /// The account label shown in authenticator apps
    pub fn totp_account_name(&self) -> String {
        self.email
            .clone()
            .unwrap_or_else(|| self.username.original().to_string())
    }

    /// Enroll in TOTP 2FA.
    ///
    /// Generates a fresh secret and provisioning URI and resets the
    /// first-verification gate. Callers must check [`Self::is_enrolled`]
    /// first; an existing secret is never rotated through this path.
    pub fn enroll_totp(&mut self, issuer: &str) -> AppResult<TotpEnrollment> {
        let secret = TotpSecret::generate();
        let provisioning_uri = secret.provisioning_uri(&self.totp_account_name(), issuer)?;

        self.totp_secret = Some(secret.clone());
        self.provisioning_uri = Some(provisioning_uri.clone());
        self.provisioning_uri_used = false;
        self.touch();

        Ok(TotpEnrollment {
            secret,
            provisioning_uri,
        })
    }

    /// Mark the provisioning QR as consumed. Idempotent.
    pub fn mark_provisioning_used(&mut self) {
        if !self.provisioning_uri_used {
            self.provisioning_uri_used = true;
            self.touch();
        }
    }

    /// Disable TOTP: clear the secret and provisioning material, record the
    /// reason, and bump the session version so outstanding sessions die.
    pub fn disable_totp(&mut self, reason: Option<String>) {
        self.totp_secret = None;
        self.provisioning_uri = None;
        self.provisioning_uri_used = false;
        self.mfa_disabled_at = Some(Utc::now());
        self.mfa_disabled_reason = Some(reason.unwrap_or_else(|| "admin disabled".to_string()));
        self.session_version += 1;
        self.touch();
    }

    /// Replace the password hash
    pub fn set_password(&mut self, new_hash: HashedPassword) {
        self.password_hash = new_hash;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn test_user() -> User {
        let hash = ClearTextPassword::new_unchecked("admin123".to_string())
            .hash(None)
            .unwrap();
        User::new(
            UserName::new("admin").unwrap(),
            Some("admin@example.com".to_string()),
            hash,
            None,
        )
    }

    #[test]
    fn test_mfa_state_machine() {
        let mut user = test_user();
        assert_eq!(user.mfa_state(), MfaState::NoMfa);

        user.enroll_totp("Backoffice").unwrap();
        assert_eq!(user.mfa_state(), MfaState::PendingFirstVerification);
        assert!(user.provisioning_uri.is_some());

        user.mark_provisioning_used();
        assert_eq!(user.mfa_state(), MfaState::Verified);

        user.disable_totp(Some("lost device".to_string()));
        assert_eq!(user.mfa_state(), MfaState::NoMfa);
        assert!(user.totp_secret.is_none());
        assert!(user.provisioning_uri.is_none());
        assert_eq!(user.mfa_disabled_reason.as_deref(), Some("lost device"));
    }

    #[test]
    fn test_mark_provisioning_used_idempotent() {
        let mut user = test_user();
        user.enroll_totp("Backoffice").unwrap();

        user.mark_provisioning_used();
        let updated = user.updated_at;
        user.mark_provisioning_used();
        assert!(user.provisioning_uri_used);
        assert_eq!(user.updated_at, updated);
    }

    #[test]
    fn test_disable_bumps_session_version() {
        let mut user = test_user();
        user.enroll_totp("Backoffice").unwrap();
        assert_eq!(user.session_version, 0);

        user.disable_totp(None);
        assert_eq!(user.session_version, 1);
        assert_eq!(user.mfa_disabled_reason.as_deref(), Some("admin disabled"));
    }

    #[test]
    fn test_totp_account_name_prefers_email() {
        let mut user = test_user();
        assert_eq!(user.totp_account_name(), "admin@example.com");
        user.email = None;
        assert_eq!(user.totp_account_name(), "admin");
    }
}
