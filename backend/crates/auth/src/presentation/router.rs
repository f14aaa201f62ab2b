//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{
    AccessStatsRepository, GeoResolver, SessionRepository, TempTokenRepository, UserRepository,
};
use crate::infra::geo::HttpGeoResolver;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the auth router with the PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, geo: HttpGeoResolver, config: AuthConfig) -> Router {
    auth_router_generic(repo, geo, config)
}

/// Create a generic auth router for any repository/resolver implementation
pub fn auth_router_generic<R, G>(repo: R, geo: G, config: AuthConfig) -> Router
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
    let state = AuthAppState {
        repo: Arc::new(repo),
        geo: Arc::new(geo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/login/password", post(handlers::login_password::<R, G>))
        .route("/login/2fa", post(handlers::login_two_factor::<R, G>))
        .route("/login/me", get(handlers::login_me::<R, G>))
        .route("/logout", post(handlers::logout::<R, G>))
        .route(
            "/users",
            post(handlers::create_user::<R, G>).get(handlers::list_users::<R, G>),
        )
        .route(
            "/users/{id}",
            put(handlers::update_user::<R, G>).delete(handlers::delete_user::<R, G>),
        )
        .route("/2fa/status", get(handlers::totp_status::<R, G>))
        .route("/2fa/setup", post(handlers::totp_setup::<R, G>))
        .route("/2fa/disable", post(handlers::totp_disable::<R, G>))
        .route(
            "/stats/access",
            post(handlers::record_access::<R, G>)
                .get(handlers::list_access::<R, G>)
                .delete(handlers::clear_access::<R, G>),
        )
        .with_state(state)
}
