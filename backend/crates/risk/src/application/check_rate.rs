//! Check Rate Use Case
//!
//! Evaluates the minute/hour/day claim windows in order. The first
//! exceeded window short-circuits with its own reason and emits a risk
//! event; later windows are not checked.

use std::sync::Arc;

use chrono::Utc;
use platform::rate_limit::RateLimitResult;
use uuid::Uuid;

use crate::application::config::ClaimRateConfig;
use crate::domain::entities::{RiskEvent, event_types};
use crate::domain::repository::{ClaimActivityRepository, RiskEventRepository};
use crate::domain::value_objects::RateWindow;
use crate::error::RiskResult;

/// Outcome of a rate check
#[derive(Debug, Clone)]
pub struct RateDecision {
    pub allowed: bool,
    /// The window that was exceeded, if any
    pub window: Option<RateWindow>,
}

impl RateDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            window: None,
        }
    }

    fn denied(window: RateWindow) -> Self {
        Self {
            allowed: false,
            window: Some(window),
        }
    }
}

/// Check Rate Use Case
pub struct CheckRateUseCase<R>
where
    R: ClaimActivityRepository + RiskEventRepository,
{
    repo: Arc<R>,
    config: Arc<ClaimRateConfig>,
}

impl<R> CheckRateUseCase<R>
where
    R: ClaimActivityRepository + RiskEventRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ClaimRateConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: Uuid) -> RiskResult<RateDecision> {
        let now = Utc::now();

        for (window, limit) in self.config.windows() {
            let since = now - chrono::Duration::milliseconds(limit.window_ms());
            let count = self.repo.count_claims_since(user_id, since).await?;
            let result = RateLimitResult::from_count(count.max(0) as u32, limit);

            if !result.allowed {
                tracing::warn!(
                    user_id = %user_id,
                    window = %window,
                    count = result.current,
                    limit = result.limit,
                    "Claim rate limit exceeded"
                );

                let event = RiskEvent::new(event_types::RATE_LIMIT_EXCEEDED, window.severity())
                    .with_user(user_id)
                    .with_details(serde_json::json!({
                        "window": window.as_str(),
                        "count": result.current,
                        "limit": result.limit,
                    }));
                self.repo.append_event(&event).await?;

                return Ok(RateDecision::denied(window));
            }
        }

        Ok(RateDecision::allowed())
    }
}
