//! Gatekeeper Use Case
//!
//! Composes blacklist, rate limiter, and risk evaluator into one
//! admission decision. Checks run in a fixed order with first-failure
//! short-circuit: blacklist entries are cheap and carry an explicit human
//! decision, so they dominate any computed score.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::check_rate::CheckRateUseCase;
use crate::application::config::{ClaimRateConfig, RiskConfig};
use crate::application::evaluate_risk::EvaluateRiskUseCase;
use crate::domain::entities::{RiskEvent, event_types};
use crate::domain::repository::{
    BlacklistRepository, ClaimActivityRepository, FingerprintRepository, IpActivityRepository,
    RiskEventRepository, UserRiskRepository,
};
use crate::domain::value_objects::{
    AdmissionDecision, BlacklistSubject, DenialReason, Severity,
};
use crate::error::RiskResult;

/// What the caller knows about the request being admitted
#[derive(Debug, Clone)]
pub struct AdmissionContext {
    pub user_id: Uuid,
    pub ip: Option<String>,
    pub visitor_id: Option<String>,
}

/// Gatekeeper Use Case
pub struct GatekeeperUseCase<R>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository,
{
    repo: Arc<R>,
    risk_config: Arc<RiskConfig>,
    rate_config: Arc<ClaimRateConfig>,
}

impl<R> GatekeeperUseCase<R>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository,
{
    pub fn new(
        repo: Arc<R>,
        risk_config: Arc<RiskConfig>,
        rate_config: Arc<ClaimRateConfig>,
    ) -> Self {
        Self {
            repo,
            risk_config,
            rate_config,
        }
    }

    pub async fn decide(&self, ctx: &AdmissionContext) -> RiskResult<AdmissionDecision> {
        // 1. Account blacklist
        if self
            .repo
            .find_active(&BlacklistSubject::User(ctx.user_id))
            .await?
            .is_some()
        {
            tracing::info!(user_id = %ctx.user_id, "Admission denied: account banned");
            return Ok(AdmissionDecision::deny(DenialReason::AccountBanned));
        }

        // 2. Device blacklist
        if let Some(visitor_id) = &ctx.visitor_id {
            if self
                .repo
                .find_active(&BlacklistSubject::Device(visitor_id.clone()))
                .await?
                .is_some()
            {
                tracing::info!(
                    user_id = %ctx.user_id,
                    visitor_id = %visitor_id,
                    "Admission denied: device banned"
                );
                return Ok(AdmissionDecision::deny(DenialReason::DeviceBanned));
            }
        }

        // 3. IP blacklist
        if let Some(ip) = &ctx.ip {
            if self
                .repo
                .find_active(&BlacklistSubject::Ip(ip.clone()))
                .await?
                .is_some()
            {
                tracing::info!(user_id = %ctx.user_id, ip = %ip, "Admission denied: ip banned");
                return Ok(AdmissionDecision::deny(DenialReason::IpBanned));
            }
        }

        // 4. Claim rate windows
        let rate = CheckRateUseCase::new(self.repo.clone(), self.rate_config.clone())
            .execute(ctx.user_id)
            .await?;
        if let Some(window) = rate.window {
            return Ok(AdmissionDecision::deny(DenialReason::RateLimited(window)));
        }

        // 5. Risk score, evaluated once and reused
        let assessment = EvaluateRiskUseCase::new(self.repo.clone(), self.risk_config.clone())
            .execute(ctx.user_id)
            .await?;

        if assessment.should_block {
            let event = RiskEvent::new(event_types::RISK_BLOCK, Severity::Critical)
                .with_user(ctx.user_id)
                .with_details(serde_json::json!({
                    "score": assessment.score.value(),
                    "factors": assessment.factors,
                }))
                .with_client(ctx.ip.clone(), ctx.visitor_id.clone());
            self.repo.append_event(&event).await?;

            tracing::warn!(
                user_id = %ctx.user_id,
                score = %assessment.score,
                "Admission denied: risk too high"
            );
            return Ok(AdmissionDecision::deny_scored(
                DenialReason::RiskTooHigh,
                assessment.score,
            ));
        }

        Ok(AdmissionDecision::allow(assessment.score))
    }
}
