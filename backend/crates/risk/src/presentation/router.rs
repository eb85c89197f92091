//! Risk Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::{ClaimRateConfig, RiskConfig};
use crate::domain::repository::{
    BlacklistRepository, ClaimActivityRepository, FingerprintRepository, IpActivityRepository,
    RiskEventRepository, UserRiskRepository,
};
use crate::infra::postgres::PgRiskRepository;
use crate::presentation::handlers::{self, RiskAppState};

/// Create the risk router with PostgreSQL repository
pub fn risk_router(
    repo: PgRiskRepository,
    risk_config: RiskConfig,
    rate_config: ClaimRateConfig,
) -> Router {
    risk_router_generic(repo, risk_config, rate_config)
}

/// Create a generic risk router for any repository implementation
pub fn risk_router_generic<R>(
    repo: R,
    risk_config: RiskConfig,
    rate_config: ClaimRateConfig,
) -> Router
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let state = RiskAppState {
        repo: Arc::new(repo),
        risk_config: Arc::new(risk_config),
        rate_config: Arc::new(rate_config),
    };

    Router::new()
        .route("/fingerprint", post(handlers::report_fingerprint::<R>))
        .route(
            "/users/{user_id}/assessment",
            get(handlers::user_assessment::<R>),
        )
        .route(
            "/blacklist",
            post(handlers::blacklist_add::<R>).delete(handlers::blacklist_remove::<R>),
        )
        .route("/score-override", post(handlers::score_override::<R>))
        .route("/events", get(handlers::list_events::<R>))
        .with_state(state)
}
