//! API Server Entry Point
//!
//! One process hosts every tenant application; each tenant talks to its
//! own logical database. Startup errors use `anyhow`; application-level
//! errors go through `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::NormalizeRolesUseCase;
use auth::{AuthConfig, HttpGeoResolver, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use payments::{HostedCheckoutClient, PaymentsConfig, PgOrderRepository, payments_router};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,payments=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // One logical database per tenant. The store tenant falls back to the
    // admin database when not configured separately (single-node setups).
    let admin_database_url =
        env::var("ADMIN_DATABASE_URL").expect("ADMIN_DATABASE_URL must be set in environment");
    let store_database_url =
        env::var("STORE_DATABASE_URL").unwrap_or_else(|_| admin_database_url.clone());

    let admin_pool = connect(&admin_database_url).await?;
    let store_pool = if store_database_url == admin_database_url {
        admin_pool.clone()
    } else {
        connect(&store_database_url).await?
    };

    tracing::info!("Connected to tenant databases");

    // Run migrations on every tenant database
    sqlx::migrate!("../../../database/migrations")
        .run(&admin_pool)
        .await?;
    if store_database_url != admin_database_url {
        sqlx::migrate!("../../../database/migrations")
            .run(&store_pool)
            .await?;
    }

    tracing::info!("Migrations completed");

    // Startup cleanup: sweep expired sessions and temp tokens.
    // Errors here should not prevent server startup.
    for (tenant, pool) in [("admin", &admin_pool), ("store", &store_pool)] {
        let repo = PgAuthRepository::new(pool.clone());
        match repo.cleanup_expired().await {
            Ok((sessions, temp_tokens)) => {
                tracing::info!(
                    tenant,
                    sessions_deleted = sessions,
                    temp_tokens_deleted = temp_tokens,
                    "Auth cleanup completed"
                );
            }
            Err(e) => {
                tracing::warn!(tenant, error = %e, "Auth cleanup failed, continuing anyway");
            }
        }
    }

    // One-time role normalization, kept off the request path
    let migrate_roles = NormalizeRolesUseCase::new(Arc::new(PgAuthRepository::new(
        admin_pool.clone(),
    )));
    match migrate_roles.execute().await {
        Ok(updated) if updated > 0 => {
            tracing::info!(updated, "Role normalization completed");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Role normalization failed, continuing anyway");
        }
    }

    // Per-tenant auth configuration
    let admin_auth_config = tenant_auth_config("admin_session", "ADMIN_TOTP_ISSUER", "Backoffice");
    let store_auth_config = tenant_auth_config("store_session", "STORE_TOTP_ISSUER", "AutoCenter");

    // Payments configuration
    let payments_config = payments_config_from_env();

    let geo_lookup_url =
        env::var("GEO_LOOKUP_URL").unwrap_or_else(|_| "http://ip-api.com/json".to_string());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router: admin panel tenant and e-commerce tenant, each over
    // its own pool
    let admin_router = auth_router(
        PgAuthRepository::new(admin_pool.clone()),
        HttpGeoResolver::new(geo_lookup_url.clone()),
        admin_auth_config,
    );

    let store_router = auth_router(
        PgAuthRepository::new(store_pool.clone()),
        HttpGeoResolver::new(geo_lookup_url),
        store_auth_config,
    )
    .merge(payments_router(
        PgOrderRepository::new(store_pool.clone()),
        HostedCheckoutClient::new(&payments_config),
        payments_config,
    ));

    let app = Router::new()
        .nest("/api/admin", admin_router)
        .nest("/api/store", store_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?)
}

fn tenant_auth_config(cookie_name: &str, issuer_var: &str, default_issuer: &str) -> AuthConfig {
    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    AuthConfig {
        session_cookie_name: cookie_name.to_string(),
        totp_issuer: env::var(issuer_var).unwrap_or_else(|_| default_issuer.to_string()),
        ..base
    }
}

fn payments_config_from_env() -> PaymentsConfig {
    let mut config = PaymentsConfig::default();

    let overrides: [(&str, &mut String); 8] = [
        ("PAYMENT_PROVIDER_URL", &mut config.provider_base_url),
        ("PAYMENT_ACCESS_TOKEN", &mut config.provider_access_token),
        ("CHECKOUT_SUCCESS_URL", &mut config.success_url),
        ("CHECKOUT_FAILURE_URL", &mut config.failure_url),
        ("CHECKOUT_PENDING_URL", &mut config.pending_url),
        ("CHECKOUT_NOTIFICATION_URL", &mut config.notification_url),
        ("CHECKOUT_STATEMENT_DESCRIPTOR", &mut config.statement_descriptor),
        ("CHECKOUT_REFERENCE_PREFIX", &mut config.external_reference_prefix),
    ];
    for (var, slot) in overrides {
        if let Ok(value) = env::var(var) {
            *slot = value;
        }
    }

    if let Ok(value) = env::var("MEDIA_BASE_URL") {
        config.media_base_url = Some(value);
    }

    config
}
