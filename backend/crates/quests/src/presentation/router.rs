//! Quests Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use risk::application::config::{ClaimRateConfig, RiskConfig};
use risk::application::gatekeeper::GatekeeperUseCase;
use risk::infra::postgres::PgRiskRepository;

use crate::application::claim_quest::AdmissionGate;
use crate::application::config::QuestConfig;
use crate::infra::postgres::PgQuestRepository;
use crate::notify::Notifier;
use crate::presentation::handlers::{self, QuestAppState, QuestStore};
use crate::verifier::SocialGraphApi;
use crate::verifier::registry::VerifierRegistry;

/// Create the quests router with PostgreSQL repositories
#[allow(clippy::too_many_arguments)]
pub fn quests_router(
    repo: PgQuestRepository,
    risk_repo: PgRiskRepository,
    registry: VerifierRegistry,
    social: Arc<dyn SocialGraphApi>,
    notifier: Arc<dyn Notifier>,
    config: QuestConfig,
    risk_config: RiskConfig,
    rate_config: ClaimRateConfig,
) -> Router {
    let gate = GatekeeperUseCase::new(
        Arc::new(risk_repo),
        Arc::new(risk_config),
        Arc::new(rate_config),
    );

    quests_router_generic(repo, gate, registry, social, notifier, config)
}

/// Create a generic quests router for any repository implementation
pub fn quests_router_generic<R, G>(
    repo: R,
    gate: G,
    registry: VerifierRegistry,
    social: Arc<dyn SocialGraphApi>,
    notifier: Arc<dyn Notifier>,
    config: QuestConfig,
) -> Router
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let state = QuestAppState {
        repo: Arc::new(repo),
        gate: Arc::new(gate),
        registry: Arc::new(registry),
        social,
        notifier,
        config: Arc::new(config),
    };

    Router::new()
        .route("/claim", post(handlers::claim::<R, G>))
        .route("/submit", post(handlers::submit::<R, G>))
        .route("/me", get(handlers::get_me::<R, G>))
        .route("/{quest_id}/action", get(handlers::get_my_action::<R, G>))
        .route("/identity/code", post(handlers::issue_binding_code::<R, G>))
        .route("/identity/confirm", post(handlers::confirm_binding::<R, G>))
        .route("/admin/review-queue", get(handlers::review_queue::<R, G>))
        .route(
            "/admin/actions/{action_id}/approve",
            post(handlers::approve_action::<R, G>),
        )
        .route(
            "/admin/actions/{action_id}/reject",
            post(handlers::reject_action::<R, G>),
        )
        .route(
            "/admin/actions/{action_id}/reopen",
            post(handlers::reopen_action::<R, G>),
        )
        .route(
            "/admin/actions/{action_id}",
            delete(handlers::delete_action::<R, G>),
        )
        .with_state(state)
}
