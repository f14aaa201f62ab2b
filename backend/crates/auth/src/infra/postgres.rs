//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AccessRecordId, UserId};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    access_record::{AccessRecord, GeoLocation},
    session::Session,
    temp_token::TempToken,
    user::User,
};
use crate::domain::repository::{
    AccessStatsRepository, SessionRepository, TempTokenRepository, UserRepository,
};
use crate::domain::value_object::{totp_secret::TotpSecret, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Startup housekeeping: sweep expired sessions and temp tokens.
    ///
    /// Expiry is otherwise only checked lazily on read.
    pub async fn cleanup_expired(&self) -> AuthResult<(u64, u64)> {
        let sessions = self.cleanup_expired_sessions().await?;
        let temp_tokens = self.cleanup_expired_temp_tokens().await?;

        tracing::info!(
            sessions_deleted = sessions,
            temp_tokens_deleted = temp_tokens,
            "Cleaned up expired auth rows"
        );

        Ok((sessions, temp_tokens))
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                username_canonical,
                email,
                password_hash,
                role,
                is_admin,
                is_active,
                totp_secret,
                provisioning_uri,
                provisioning_uri_used,
                session_version,
                mfa_disabled_at,
                mfa_disabled_reason,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(&user.email)
        .bind(user.password_hash.as_phc_string())
        .bind(&user.role)
        .bind(user.is_admin)
        .bind(user.is_active)
        .bind(user.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(&user.provisioning_uri)
        .bind(user.provisioning_uri_used)
        .bind(user.session_version)
        .bind(user.mfa_disabled_at)
        .bind(&user.mfa_disabled_reason)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                username_canonical,
                email,
                password_hash,
                role,
                is_admin,
                is_active,
                totp_secret,
                provisioning_uri,
                provisioning_uri_used,
                session_version,
                mfa_disabled_at,
                mfa_disabled_reason,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_username(&self, canonical: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                username_canonical,
                email,
                password_hash,
                role,
                is_admin,
                is_active,
                totp_secret,
                provisioning_uri,
                provisioning_uri_used,
                session_version,
                mfa_disabled_at,
                mfa_disabled_reason,
                created_at,
                updated_at
            FROM users
            WHERE username_canonical = $1
            "#,
        )
        .bind(canonical)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_username(&self, canonical: &str) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_canonical = $1)",
        )
        .bind(canonical)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                username_canonical = $3,
                email = $4,
                password_hash = $5,
                role = $6,
                is_admin = $7,
                is_active = $8,
                totp_secret = $9,
                provisioning_uri = $10,
                provisioning_uri_used = $11,
                session_version = $12,
                mfa_disabled_at = $13,
                mfa_disabled_reason = $14,
                updated_at = $15
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(&user.email)
        .bind(user.password_hash.as_phc_string())
        .bind(&user.role)
        .bind(user.is_admin)
        .bind(user.is_active)
        .bind(user.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(&user.provisioning_uri)
        .bind(user.provisioning_uri_used)
        .bind(user.session_version)
        .bind(user.mfa_disabled_at)
        .bind(&user.mfa_disabled_reason)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                username_canonical,
                email,
                password_hash,
                role,
                is_admin,
                is_active,
                totp_secret,
                provisioning_uri,
                provisioning_uri_used,
                session_version,
                mfa_disabled_at,
                mfa_disabled_reason,
                created_at,
                updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_user()).collect()
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                token,
                user_id,
                session_version,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id.as_uuid())
        .bind(session.session_version)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, token: &str) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token, user_id, session_version, expires_at, created_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn delete_session(&self, token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Temp Token Repository Implementation
// ============================================================================

impl TempTokenRepository for PgAuthRepository {
    async fn create_temp_token(&self, token: &TempToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO temp_tokens (
                token,
                user_id,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id.as_uuid())
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_temp_token(&self, token: &str) -> AuthResult<Option<TempToken>> {
        let row = sqlx::query_as::<_, TempTokenRow>(
            r#"
            SELECT token, user_id, expires_at, created_at
            FROM temp_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_temp_token()))
    }

    async fn delete_temp_token(&self, token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM temp_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_temp_tokens(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM temp_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Access Stats Repository Implementation
// ============================================================================

impl AccessStatsRepository for PgAuthRepository {
    async fn create_access_record(&self, record: &AccessRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_stats (
                id,
                ip,
                country,
                city,
                latitude,
                longitude,
                recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.ip)
        .bind(record.location.as_ref().and_then(|l| l.country.clone()))
        .bind(record.location.as_ref().and_then(|l| l.city.clone()))
        .bind(record.location.as_ref().map(|l| l.latitude))
        .bind(record.location.as_ref().map(|l| l.longitude))
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_access_records(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AuthResult<Vec<AccessRecord>> {
        let rows = match (start, end) {
            (Some(start), Some(end)) => {
                sqlx::query_as::<_, AccessRecordRow>(
                    r#"
                    SELECT id, ip, country, city, latitude, longitude, recorded_at
                    FROM access_stats
                    WHERE recorded_at >= $1 AND recorded_at <= $2
                    ORDER BY recorded_at DESC
                    LIMIT 1000
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(start), None) => {
                sqlx::query_as::<_, AccessRecordRow>(
                    r#"
                    SELECT id, ip, country, city, latitude, longitude, recorded_at
                    FROM access_stats
                    WHERE recorded_at >= $1
                    ORDER BY recorded_at DESC
                    LIMIT 1000
                    "#,
                )
                .bind(start)
                .fetch_all(&self.pool)
                .await?
            }
            (None, Some(end)) => {
                sqlx::query_as::<_, AccessRecordRow>(
                    r#"
                    SELECT id, ip, country, city, latitude, longitude, recorded_at
                    FROM access_stats
                    WHERE recorded_at <= $1
                    ORDER BY recorded_at DESC
                    LIMIT 1000
                    "#,
                )
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
            (None, None) => {
                sqlx::query_as::<_, AccessRecordRow>(
                    r#"
                    SELECT id, ip, country, city, latitude, longitude, recorded_at
                    FROM access_stats
                    ORDER BY recorded_at DESC
                    LIMIT 1000
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }

    async fn clear_access_records(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM access_stats")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    #[allow(dead_code)]
    username_canonical: String,
    email: Option<String>,
    password_hash: String,
    role: Option<String>,
    is_admin: bool,
    is_active: bool,
    totp_secret: Option<String>,
    provisioning_uri: Option<String>,
    provisioning_uri_used: bool,
    session_version: i32,
    mfa_disabled_at: Option<DateTime<Utc>>,
    mfa_disabled_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        let totp_secret = self
            .totp_secret
            .map(TotpSecret::from_base32)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: UserName::from_db(&self.username),
            email: self.email,
            password_hash,
            role: self.role,
            is_admin: self.is_admin,
            is_active: self.is_active,
            totp_secret,
            provisioning_uri: self.provisioning_uri,
            provisioning_uri_used: self.provisioning_uri_used,
            session_version: self.session_version,
            mfa_disabled_at: self.mfa_disabled_at,
            mfa_disabled_reason: self.mfa_disabled_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: Uuid,
    session_version: i32,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            token: self.token,
            user_id: UserId::from_uuid(self.user_id),
            session_version: self.session_version,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TempTokenRow {
    token: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TempTokenRow {
    fn into_temp_token(self) -> TempToken {
        TempToken {
            token: self.token,
            user_id: UserId::from_uuid(self.user_id),
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AccessRecordRow {
    id: Uuid,
    ip: String,
    country: Option<String>,
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    recorded_at: DateTime<Utc>,
}

impl AccessRecordRow {
    fn into_record(self) -> AccessRecord {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoLocation {
                country: self.country,
                city: self.city,
                latitude,
                longitude,
            }),
            _ => None,
        };

        AccessRecord {
            id: AccessRecordId::from_uuid(self.id),
            ip: self.ip,
            location,
            recorded_at: self.recorded_at,
        }
    }
}
