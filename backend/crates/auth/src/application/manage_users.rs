//! User Management Use Case
//!
//! Admin-side CRUD over collaborator accounts, including the 2FA
//! enrollment toggle on create/update.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Create user input
pub struct CreateUserInput {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Option<String>,
    /// Enroll in TOTP at creation time
    pub enable_2fa: bool,
}

/// Update user input; `None` fields are left untouched
#[derive(Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub enable_2fa: Option<bool>,
}

/// User management use case
pub struct ManageUsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ManageUsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create a new user. Accounts start active and non-admin; privilege
    /// is granted through update by an existing administrator.
    pub async fn create(&self, input: CreateUserInput) -> AuthResult<User> {
        let username =
            UserName::new(&input.username).map_err(|e| AuthError::InvalidUserName(e.to_string()))?;

        if self.user_repo.exists_by_username(username.canonical()).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = password.hash(self.config.pepper())?;

        let mut user = User::new(username, input.email, password_hash, input.role);

        if input.enable_2fa {
            user.enroll_totp(&self.config.totp_issuer)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        }

        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            twofa = input.enable_2fa,
            "User created"
        );

        Ok(user)
    }

    /// Update an existing user.
    pub async fn update(&self, user_id: &UserId, input: UpdateUserInput) -> AuthResult<User> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(raw) = input.username {
            let username =
                UserName::new(&raw).map_err(|e| AuthError::InvalidUserName(e.to_string()))?;
            if username.canonical() != user.username.canonical()
                && self.user_repo.exists_by_username(username.canonical()).await?
            {
                return Err(AuthError::UsernameTaken);
            }
            user.username = username;
        }

        if let Some(email) = input.email {
            user.email = Some(email);
        }

        if let Some(role) = input.role {
            user.role = Some(role);
        }

        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }

        if let Some(is_admin) = input.is_admin {
            user.is_admin = is_admin;
        }

        // Empty password strings mean "leave unchanged"
        if let Some(password) = input.password.filter(|p| !p.trim().is_empty()) {
            let password = ClearTextPassword::new(password)?;
            user.set_password(password.hash(self.config.pepper())?);
        }

        match input.enable_2fa {
            // Enroll when there is no usable provisioning material yet
            Some(true) if !user.is_enrolled() || user.provisioning_uri.is_none() => {
                user.enroll_totp(&self.config.totp_issuer)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
            }
            Some(false) if user.is_enrolled() => {
                user.disable_totp(Some("admin update".to_string()));
            }
            _ => {}
        }

        user.touch();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user_id, "User updated");

        Ok(user)
    }

    /// Delete a user.
    pub async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        if !self.user_repo.delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// List all users.
    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.user_repo.list().await
    }
}
