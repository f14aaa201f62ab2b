//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::access_record::{AccessRecord, GeoLocation};
use crate::domain::entity::user::User;

// ============================================================================
// Login
// ============================================================================

/// Password login request
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordLoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned when the account has 2FA enabled: the client must redeem the
/// temp token with a code. `provisioning_uri` is non-null only until the
/// first successful verification.
#[derive(Debug, Clone, Serialize)]
pub struct TwoFactorChallengeResponse {
    #[serde(rename = "2fa_required")]
    pub two_fa_required: bool,
    pub temp_token: String,
    pub provisioning_uri: Option<String>,
}

/// 2FA login request
#[derive(Debug, Clone, Deserialize)]
pub struct TwoFactorLoginRequest {
    pub temp_token: String,
    pub twofa_code: String,
}

/// Successful login response (session cookie travels separately)
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserOut,
}

/// Current user response
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserOut,
}

/// Generic message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Users
// ============================================================================

/// Public view of a user; never carries hashes or secrets
#[derive(Debug, Clone, Serialize)]
pub struct UserOut {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub twofa_enabled: bool,
    pub provisioning_uri_used: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: *user.user_id.as_uuid(),
            username: user.username.original().to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            twofa_enabled: user.is_enrolled(),
            provisioning_uri_used: user.provisioning_uri_used,
            created_at: user.created_at,
        }
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Option<String>,
    #[serde(default)]
    pub enable_2fa: bool,
}

/// Update user request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub enable_2fa: Option<bool>,
}

// ============================================================================
// 2FA administration
// ============================================================================

/// 2FA setup request
#[derive(Debug, Clone, Deserialize)]
pub struct TotpSetupRequest {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
}

/// 2FA setup response
#[derive(Debug, Clone, Serialize)]
pub struct TotpSetupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_enrolled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// 2FA status query (`userId` accepted for older frontends)
#[derive(Debug, Clone, Deserialize)]
pub struct TotpStatusQuery {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
}

/// 2FA status response
#[derive(Debug, Clone, Serialize)]
pub struct TotpStatusResponse {
    pub enrolled: bool,
}

/// 2FA disable request
#[derive(Debug, Clone, Deserialize)]
pub struct TotpDisableRequest {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
    pub reason: Option<String>,
}

// ============================================================================
// Access statistics
// ============================================================================

/// Access record request; the connection IP is used when absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessStatRequest {
    pub ip: Option<String>,
}

/// Location in list responses
#[derive(Debug, Clone, Serialize)]
pub struct LocationOut {
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&GeoLocation> for LocationOut {
    fn from(loc: &GeoLocation) -> Self {
        Self {
            country: loc.country.clone(),
            city: loc.city.clone(),
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

/// Access record in list responses
#[derive(Debug, Clone, Serialize)]
pub struct AccessStatOut {
    pub ip: String,
    pub location: Option<LocationOut>,
    pub timestamp: DateTime<Utc>,
}

impl From<&AccessRecord> for AccessStatOut {
    fn from(record: &AccessRecord) -> Self {
        Self {
            ip: record.ip.clone(),
            location: record.location.as_ref().map(LocationOut::from),
            timestamp: record.recorded_at,
        }
    }
}

/// Access record date filters (ISO date or RFC 3339 datetime)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessStatListQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Simple acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse {
    pub result: String,
}
