//! Use-case tests over in-memory repositories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use uuid::Uuid;

use crate::application::{
    AccessStatsUseCase, AuthenticateInput, AuthenticateOutput, AuthenticateUseCase,
    CheckSessionUseCase, CreateUserInput, LogoutUseCase, ManageUsersUseCase, NormalizeRolesUseCase,
    TotpSetupOutput, TwoFactorAdminUseCase, UpdateUserInput, VerifyTwoFactorUseCase,
    config::AuthConfig,
};
use crate::domain::entity::access_record::{AccessRecord, GeoLocation};
use crate::domain::entity::{session::Session, temp_token::TempToken, user::User};
use crate::domain::repository::{
    AccessStatsRepository, GeoError, GeoResolver, SessionRepository, TempTokenRepository,
    UserRepository,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// In-memory repository
// ============================================================================

#[derive(Clone, Default)]
struct MemRepo {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    temp_tokens: Arc<Mutex<HashMap<String, TempToken>>>,
    stats: Arc<Mutex<Vec<AccessRecord>>>,
}

impl UserRepository for MemRepo {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users
            .lock()
            .unwrap()
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(user_id.as_uuid()).cloned())
    }

    async fn find_by_username(&self, canonical: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username.canonical() == canonical)
            .cloned())
    }

    async fn exists_by_username(&self, canonical: &str) -> AuthResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.username.canonical() == canonical))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.users
            .lock()
            .unwrap()
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.users.lock().unwrap().remove(user_id.as_uuid()).is_some())
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }
}

impl SessionRepository for MemRepo {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> AuthResult<Option<Session>> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> AuthResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

impl TempTokenRepository for MemRepo {
    async fn create_temp_token(&self, token: &TempToken) -> AuthResult<()> {
        self.temp_tokens
            .lock()
            .unwrap()
            .insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_temp_token(&self, token: &str) -> AuthResult<Option<TempToken>> {
        Ok(self.temp_tokens.lock().unwrap().get(token).cloned())
    }

    async fn delete_temp_token(&self, token: &str) -> AuthResult<()> {
        self.temp_tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn cleanup_expired_temp_tokens(&self) -> AuthResult<u64> {
        let mut tokens = self.temp_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}

impl AccessStatsRepository for MemRepo {
    async fn create_access_record(&self, record: &AccessRecord) -> AuthResult<()> {
        self.stats.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_access_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AuthResult<Vec<AccessRecord>> {
        Ok(self
            .stats
            .lock()
            .unwrap()
            .iter()
            .filter(|r| start.is_none_or(|s| r.recorded_at >= s))
            .filter(|r| end.is_none_or(|e| r.recorded_at <= e))
            .cloned()
            .collect())
    }

    async fn clear_access_records(&self) -> AuthResult<u64> {
        let mut stats = self.stats.lock().unwrap();
        let deleted = stats.len() as u64;
        stats.clear();
        Ok(deleted)
    }
}

/// Resolver that either succeeds with a fixed location or always fails
#[derive(Clone)]
struct FixedGeo {
    fail: bool,
}

impl GeoResolver for FixedGeo {
    async fn lookup(&self, _ip: &str) -> Result<GeoLocation, GeoError> {
        if self.fail {
            return Err(GeoError::Unavailable("lookup disabled".to_string()));
        }
        Ok(GeoLocation {
            country: Some("Brazil".to_string()),
            city: Some("Rio de Janeiro".to_string()),
            latitude: -22.9068,
            longitude: -43.1729,
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

struct Harness {
    repo: Arc<MemRepo>,
    config: Arc<AuthConfig>,
}

impl Harness {
    fn new() -> Self {
        Self {
            repo: Arc::new(MemRepo::default()),
            config: Arc::new(AuthConfig::development()),
        }
    }

    fn authenticate(&self) -> AuthenticateUseCase<MemRepo, MemRepo, MemRepo> {
        AuthenticateUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
        )
    }

    fn verify_2fa(&self) -> VerifyTwoFactorUseCase<MemRepo, MemRepo, MemRepo> {
        VerifyTwoFactorUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
        )
    }

    fn check_session(&self) -> CheckSessionUseCase<MemRepo, MemRepo> {
        CheckSessionUseCase::new(self.repo.clone(), self.repo.clone())
    }

    fn manage_users(&self) -> ManageUsersUseCase<MemRepo> {
        ManageUsersUseCase::new(self.repo.clone(), self.config.clone())
    }

    fn two_factor_admin(&self) -> TwoFactorAdminUseCase<MemRepo> {
        TwoFactorAdminUseCase::new(self.repo.clone(), self.config.clone())
    }

    async fn seed_user(&self, username: &str, password: &str, enable_2fa: bool) -> User {
        self.manage_users()
            .create(CreateUserInput {
                username: username.to_string(),
                email: Some(format!("{username}@example.com")),
                password: password.to_string(),
                role: None,
                enable_2fa,
            })
            .await
            .unwrap()
    }

    fn totp_code(&self, user: &User) -> String {
        user.totp_secret
            .as_ref()
            .unwrap()
            .generate_current(&user.totp_account_name(), &self.config.totp_issuer)
            .unwrap()
    }
}

// ============================================================================
// Password authentication
// ============================================================================

#[tokio::test]
async fn test_login_without_2fa_creates_verifiable_session() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;

    let output = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap();

    let AuthenticateOutput::SignedIn { session_token, .. } = output else {
        panic!("expected a direct session");
    };

    let current = h.check_session().execute(&session_token).await.unwrap();
    assert_eq!(current.unwrap().user_id, user.user_id);
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_username() {
    let h = Harness::new();
    h.seed_user("admin", "admin123!", false).await;

    let output = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "ADMIN".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap();

    assert!(matches!(output, AuthenticateOutput::SignedIn { .. }));
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_user() {
    let h = Harness::new();
    h.seed_user("admin", "admin123!", false).await;

    let err = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "nobody".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_rejects_inactive_account() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;

    h.manage_users()
        .update(
            &user.user_id,
            UpdateUserInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountDisabled));
}

// ============================================================================
// 2FA flow
// ============================================================================

#[tokio::test]
async fn test_2fa_flow_shows_qr_only_until_first_verification() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", true).await;

    // First login: the challenge carries the provisioning URI
    let output = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap();

    let AuthenticateOutput::TwoFactorRequired {
        temp_token,
        provisioning_uri,
    } = output
    else {
        panic!("expected a 2FA challenge");
    };
    assert!(provisioning_uri.is_some());

    // Redeem the temp token with a valid code
    let verified = h
        .verify_2fa()
        .execute(&temp_token, &h.totp_code(&user))
        .await
        .unwrap();

    let current = h
        .check_session()
        .execute(&verified.session_token)
        .await
        .unwrap();
    assert_eq!(current.unwrap().user_id, user.user_id);

    // Token was consumed: a replay fails
    let err = h
        .verify_2fa()
        .execute(&temp_token, &h.totp_code(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TempTokenInvalid));

    // Second login: QR no longer offered
    let output = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap();

    let AuthenticateOutput::TwoFactorRequired {
        provisioning_uri, ..
    } = output
    else {
        panic!("expected a 2FA challenge");
    };
    assert!(provisioning_uri.is_none());
}

#[tokio::test]
async fn test_expired_temp_token_fails_regardless_of_code() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", true).await;

    let stale = TempToken::issue(user.user_id, Duration::minutes(-1));
    h.repo.create_temp_token(&stale).await.unwrap();

    let err = h
        .verify_2fa()
        .execute(&stale.token, &h.totp_code(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TempTokenInvalid));
}

#[tokio::test]
async fn test_wrong_code_keeps_temp_token_alive() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", true).await;

    let output = h
        .authenticate()
        .execute(AuthenticateInput {
            username: "admin".to_string(),
            password: "admin123!".to_string(),
        })
        .await
        .unwrap();
    let AuthenticateOutput::TwoFactorRequired { temp_token, .. } = output else {
        panic!("expected a 2FA challenge");
    };

    let err = h
        .verify_2fa()
        .execute(&temp_token, "000000")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidTwoFactorCode));

    // Failure does not consume the token; a correct retry succeeds
    let verified = h
        .verify_2fa()
        .execute(&temp_token, &h.totp_code(&user))
        .await;
    assert!(verified.is_ok());
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_expired_session_resolves_to_none_and_is_swept() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;

    let stale = Session::issue(&user, Duration::minutes(-1));
    h.repo.create_session(&stale).await.unwrap();

    let current = h.check_session().execute(&stale.token).await.unwrap();
    assert!(current.is_none());

    // The stale row was deleted on read
    assert!(h.repo.find_session(&stale.token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;
    let session = Session::issue(&user, Duration::minutes(30));
    h.repo.create_session(&session).await.unwrap();

    let logout = LogoutUseCase::new(h.repo.clone());
    logout.execute(&session.token).await.unwrap();
    logout.execute(&session.token).await.unwrap();

    let current = h.check_session().execute(&session.token).await.unwrap();
    assert!(current.is_none());
}

#[tokio::test]
async fn test_disabling_2fa_invalidates_outstanding_sessions() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", true).await;

    let session = Session::issue(&user, Duration::minutes(30));
    h.repo.create_session(&session).await.unwrap();
    assert!(h.check_session().execute(&session.token).await.unwrap().is_some());

    h.two_factor_admin()
        .disable(&user.user_id, Some("device lost".to_string()))
        .await
        .unwrap();

    // The session_version bump supersedes the session
    let current = h.check_session().execute(&session.token).await.unwrap();
    assert!(current.is_none());
}

// ============================================================================
// 2FA administration
// ============================================================================

#[tokio::test]
async fn test_totp_setup_does_not_rotate_existing_secret() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", true).await;
    let original_secret = user.totp_secret.as_ref().unwrap().as_base32().to_string();

    let output = h.two_factor_admin().setup(&user.user_id).await.unwrap();
    assert!(matches!(output, TotpSetupOutput::AlreadyEnrolled));

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert_eq!(
        stored.totp_secret.as_ref().unwrap().as_base32(),
        original_secret
    );
}

#[tokio::test]
async fn test_totp_setup_enrolls_unenrolled_user() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;

    let output = h.two_factor_admin().setup(&user.user_id).await.unwrap();
    let TotpSetupOutput::Enrolled {
        secret,
        provisioning_uri,
        qr_code,
    } = output
    else {
        panic!("expected enrollment");
    };

    assert!(!secret.is_empty());
    assert!(provisioning_uri.starts_with("otpauth://totp/"));
    assert!(qr_code.starts_with("data:image/png;base64,"));

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert!(stored.is_enrolled());
    assert!(!stored.provisioning_uri_used);
}

// ============================================================================
// User management
// ============================================================================

#[tokio::test]
async fn test_duplicate_username_rejected_case_insensitively() {
    let h = Harness::new();
    h.seed_user("admin", "admin123!", false).await;

    let err = h
        .manage_users()
        .create(CreateUserInput {
            username: "Admin".to_string(),
            email: None,
            password: "outra-senha1!".to_string(),
            role: None,
            enable_2fa: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken));
}

#[tokio::test]
async fn test_update_toggles_2fa_enrollment() {
    let h = Harness::new();
    let user = h.seed_user("admin", "admin123!", false).await;

    let updated = h
        .manage_users()
        .update(
            &user.user_id,
            UpdateUserInput {
                enable_2fa: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_enrolled());

    let updated = h
        .manage_users()
        .update(
            &user.user_id,
            UpdateUserInput {
                enable_2fa: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_enrolled());
    assert_eq!(updated.mfa_disabled_reason.as_deref(), Some("admin update"));
    assert_eq!(updated.session_version, 1);
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let h = Harness::new();
    let err = h.manage_users().delete(&UserId::new()).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

// ============================================================================
// Access statistics
// ============================================================================

#[tokio::test]
async fn test_geo_failure_never_blocks_the_write() {
    let h = Harness::new();
    let use_case = AccessStatsUseCase::new(h.repo.clone(), Arc::new(FixedGeo { fail: true }));

    let record = use_case.record("203.0.113.9".to_string()).await.unwrap();
    assert!(record.location.is_none());

    let listed = use_case.list(None, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].ip, "203.0.113.9");
}

#[tokio::test]
async fn test_geo_success_is_stored_with_the_record() {
    let h = Harness::new();
    let use_case = AccessStatsUseCase::new(h.repo.clone(), Arc::new(FixedGeo { fail: false }));

    let record = use_case.record("203.0.113.9".to_string()).await.unwrap();
    let location = record.location.unwrap();
    assert_eq!(location.city.as_deref(), Some("Rio de Janeiro"));

    assert_eq!(use_case.clear().await.unwrap(), 1);
    assert!(use_case.list(None, None).await.unwrap().is_empty());
}

// ============================================================================
// Maintenance
// ============================================================================

#[tokio::test]
async fn test_role_normalization_is_idempotent() {
    let h = Harness::new();
    let user = h.seed_user("maria", "senha-forte1!", false).await;

    h.manage_users()
        .update(
            &user.user_id,
            UpdateUserInput {
                role: Some("doctor".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let migrate = NormalizeRolesUseCase::new(h.repo.clone());
    assert_eq!(migrate.execute().await.unwrap(), 1);

    let stored = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
    assert_eq!(stored.role.as_deref(), Some("medico"));

    // Second run finds nothing left to change
    assert_eq!(migrate.execute().await.unwrap(), 0);
}
