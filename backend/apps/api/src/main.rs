//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, http,
    http::{Method, header},
};
use quests::infra::providers::HttpProviderGateway;
use quests::notify::NoopNotifier;
use quests::{PgQuestRepository, QuestConfig, VerifierRegistry, quests_router};
use risk::{ClaimRateConfig, PgRiskRepository, RiskConfig, risk_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,quests=info,risk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: expired blacklist entries and binding codes.
    // Errors here should not prevent server startup.
    let risk_store = PgRiskRepository::new(pool.clone());
    match risk_store.cleanup_expired().await {
        Ok(entries) => {
            tracing::info!(entries_deleted = entries, "Blacklist cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Blacklist cleanup failed, continuing anyway");
        }
    }

    let quest_store = PgQuestRepository::new(pool.clone());
    match quest_store.cleanup_expired().await {
        Ok(codes) => {
            tracing::info!(codes_deleted = codes, "Binding code cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Binding code cleanup failed, continuing anyway");
        }
    }

    // Verification provider gateway
    let gateway_url = env::var("VERIFICATION_GATEWAY_URL")
        .unwrap_or_else(|_| "http://localhost:8090".to_string());
    let gateway = Arc::new(
        HttpProviderGateway::new(gateway_url).map_err(|e| anyhow::anyhow!(e.to_string()))?,
    );

    let quest_config = QuestConfig::default();
    let registry = VerifierRegistry::with_defaults(
        gateway.clone(),
        gateway.clone(),
        gateway.clone(),
        quest_config.screenshot_confidence_threshold,
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/quests",
            quests_router(
                quest_store,
                risk_store.clone(),
                registry,
                gateway,
                Arc::new(NoopNotifier),
                quest_config,
                RiskConfig::default(),
                ClaimRateConfig::default(),
            ),
        )
        .nest(
            "/api/risk",
            risk_router(
                risk_store,
                RiskConfig::default(),
                ClaimRateConfig::default(),
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
