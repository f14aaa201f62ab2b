//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use kernel::id::UserId;
use platform::client::extract_client_ip;
use platform::cookie::CookieConfig;

use crate::application::config::AuthConfig;
use crate::application::{
    AccessStatsUseCase, AuthenticateInput, AuthenticateOutput, AuthenticateUseCase,
    CheckSessionUseCase, CreateUserInput, LogoutUseCase, ManageUsersUseCase, TotpSetupOutput,
    TwoFactorAdminUseCase, UpdateUserInput, VerifyTwoFactorUseCase,
};
use crate::domain::repository::{
    AccessStatsRepository, GeoResolver, SessionRepository, TempTokenRepository, UserRepository,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessStatListQuery, AccessStatOut, AccessStatRequest, CreateUserRequest, LoginResponse,
    MeResponse, MessageResponse, PasswordLoginRequest, ResultResponse, TotpDisableRequest,
    TotpSetupRequest, TotpSetupResponse, TotpStatusQuery, TotpStatusResponse,
    TwoFactorChallengeResponse, TwoFactorLoginRequest, UpdateUserRequest, UserOut,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, G>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub geo: Arc<G>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Login / Session
// ============================================================================

/// POST /login/password
pub async fn login_password<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Json(req): Json<PasswordLoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let use_case = AuthenticateUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(AuthenticateInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    match output {
        AuthenticateOutput::TwoFactorRequired {
            temp_token,
            provisioning_uri,
        } => Ok(Json(TwoFactorChallengeResponse {
            two_fa_required: true,
            temp_token,
            provisioning_uri,
        })
        .into_response()),
        AuthenticateOutput::SignedIn {
            session_token,
            user,
        } => {
            let cookie = session_cookie(&state.config, &session_token);
            Ok((
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(LoginResponse {
                    message: "Login successful".to_string(),
                    user: UserOut::from(&user),
                }),
            )
                .into_response())
        }
    }
}

/// POST /login/2fa
pub async fn login_two_factor<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Json(req): Json<TwoFactorLoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let use_case = VerifyTwoFactorUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(&req.temp_token, &req.twofa_code).await?;

    let cookie = session_cookie(&state.config, &output.session_token);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserOut::from(&output.user),
        }),
    ))
}

/// GET /login/me
pub async fn login_me<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
) -> AuthResult<Json<MeResponse>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let token = session_token(&state, &headers).ok_or(AuthError::SessionInvalid)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.repo.clone());
    let user = use_case
        .execute(&token)
        .await?
        .ok_or(AuthError::SessionInvalid)?;

    Ok(Json(MeResponse {
        user: UserOut::from(&user),
    }))
}

/// POST /logout
pub async fn logout<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    if let Some(token) = session_token(&state, &headers) {
        let use_case = LogoutUseCase::new(state.repo.clone());
        use_case.execute(&token).await?;
    }

    let cookie = clear_cookie(&state.config);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

// ============================================================================
// Users (admin only)
// ============================================================================

/// POST /users
pub async fn create_user<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case
        .create(CreateUserInput {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
            enable_2fa: req.enable_2fa,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserOut::from(&user))))
}

/// GET /users
pub async fn list_users<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
) -> AuthResult<Json<Vec<UserOut>>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    let users = use_case.list().await?;

    Ok(Json(users.iter().map(UserOut::from).collect()))
}

/// PUT /users/{id}
pub async fn update_user<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<UserOut>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case
        .update(
            &UserId::from_uuid(id),
            UpdateUserInput {
                username: req.username,
                email: req.email,
                role: req.role,
                password: req.password,
                is_active: req.is_active,
                is_admin: req.is_admin,
                enable_2fa: req.enable_2fa,
            },
        )
        .await?;

    Ok(Json(UserOut::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> AuthResult<StatusCode>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = ManageUsersUseCase::new(state.repo.clone(), state.config.clone());
    use_case.delete(&UserId::from_uuid(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// 2FA administration
// ============================================================================

/// GET /2fa/status
pub async fn totp_status<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Query(query): Query<TotpStatusQuery>,
) -> AuthResult<Json<TotpStatusResponse>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let use_case = TwoFactorAdminUseCase::new(state.repo.clone(), state.config.clone());
    let enrolled = use_case.status(&UserId::from_uuid(query.user_id)).await?;

    Ok(Json(TotpStatusResponse { enrolled }))
}

/// POST /2fa/setup
pub async fn totp_setup<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
    Json(req): Json<TotpSetupRequest>,
) -> AuthResult<Json<TotpSetupResponse>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = TwoFactorAdminUseCase::new(state.repo.clone(), state.config.clone());

    match use_case.setup(&UserId::from_uuid(req.user_id)).await? {
        TotpSetupOutput::AlreadyEnrolled => Ok(Json(TotpSetupResponse {
            already_enrolled: Some(true),
            secret: None,
            provisioning_uri: None,
            qr_code: None,
        })),
        TotpSetupOutput::Enrolled {
            secret,
            provisioning_uri,
            qr_code,
        } => Ok(Json(TotpSetupResponse {
            already_enrolled: None,
            secret: Some(secret),
            provisioning_uri: Some(provisioning_uri),
            qr_code: Some(qr_code),
        })),
    }
}

/// POST /2fa/disable
pub async fn totp_disable<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
    Json(req): Json<TotpDisableRequest>,
) -> AuthResult<Json<ResultResponse>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = TwoFactorAdminUseCase::new(state.repo.clone(), state.config.clone());
    use_case
        .disable(&UserId::from_uuid(req.user_id), req.reason)
        .await?;

    Ok(Json(ResultResponse {
        result: "ok".to_string(),
    }))
}

// ============================================================================
// Access statistics
// ============================================================================

/// POST /stats/access
pub async fn record_access<R, G>(
    State(state): State<AuthAppState<R, G>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<AccessStatRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let ip = req.ip.unwrap_or_else(|| {
        extract_client_ip(&headers, Some(addr.ip()))
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| addr.ip().to_string())
    });

    let use_case = AccessStatsUseCase::new(state.repo.clone(), state.geo.clone());
    use_case.record(ip).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResultResponse {
            result: "ok".to_string(),
        }),
    ))
}

/// GET /stats/access
pub async fn list_access<R, G>(
    State(state): State<AuthAppState<R, G>>,
    Query(query): Query<AccessStatListQuery>,
) -> AuthResult<Json<Vec<AccessStatOut>>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let use_case = AccessStatsUseCase::new(state.repo.clone(), state.geo.clone());
    let records = use_case.list(query.start, query.end).await?;

    Ok(Json(records.iter().map(AccessStatOut::from).collect()))
}

/// DELETE /stats/access
pub async fn clear_access<R, G>(
    State(state): State<AuthAppState<R, G>>,
    headers: HeaderMap,
) -> AuthResult<Json<ResultResponse>>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    require_admin(&state, &headers).await?;

    let use_case = AccessStatsUseCase::new(state.repo.clone(), state.geo.clone());
    use_case.clear().await?;

    Ok(Json(ResultResponse {
        result: "cleared".to_string(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn session_token<R, G>(state: &AuthAppState<R, G>, headers: &HeaderMap) -> Option<String>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    platform::cookie::extract_cookie(headers, &state.config.session_cookie_name)
}

/// Admin-mutating endpoints require a valid session with `is_admin`.
async fn require_admin<R, G>(
    state: &AuthAppState<R, G>,
    headers: &HeaderMap,
) -> AuthResult<crate::domain::entity::user::User>
where
    R: UserRepository
        + SessionRepository
        + TempTokenRepository
        + AccessStatsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    G: GeoResolver + Clone + Send + Sync + 'static,
{
    let token = session_token(state, headers).ok_or(AuthError::SessionInvalid)?;
    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.require_admin(&token).await
}

fn cookie_config(config: &AuthConfig) -> CookieConfig {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.session_max_age_secs()),
    }
}

fn session_cookie(config: &AuthConfig, token: &str) -> String {
    cookie_config(config).build_set_cookie(token)
}

fn clear_cookie(config: &AuthConfig) -> String {
    cookie_config(config).build_delete_cookie()
}
