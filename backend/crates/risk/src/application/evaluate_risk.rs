//! Evaluate Risk Use Case
//!
//! Gathers evidence from the fraud graphs, scores it, and persists the
//! recomputed score onto the user. Not free: callers must evaluate at
//! most once per admission decision and reuse the assessment.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::config::RiskConfig;
use crate::domain::repository::{
    ClaimActivityRepository, FingerprintRepository, IpActivityRepository, RiskEventRepository,
    UserRiskRepository,
};
use crate::domain::services::{self, RiskSignals};
use crate::domain::value_objects::RiskAssessment;
use crate::error::{RiskError, RiskResult};

/// Evaluate Risk Use Case
pub struct EvaluateRiskUseCase<R>
where
    R: FingerprintRepository
        + IpActivityRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository,
{
    repo: Arc<R>,
    config: Arc<RiskConfig>,
}

impl<R> EvaluateRiskUseCase<R>
where
    R: FingerprintRepository
        + IpActivityRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<RiskConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: Uuid) -> RiskResult<RiskAssessment> {
        let now = Utc::now();

        let created_at = self
            .repo
            .account_created_at(user_id)
            .await?
            .ok_or(RiskError::UserNotFound)?;

        let device_count = self.repo.count_devices_for_user(user_id).await?;
        let shared_device = self.repo.user_has_shared_device(user_id).await?;
        let crowded_ip = self
            .repo
            .user_has_crowded_ip(user_id, self.config.ip_user_threshold)
            .await?;
        let claims_last_hour = self
            .repo
            .count_claims_since(user_id, now - chrono::Duration::hours(1))
            .await?;
        let flagged_events = self
            .repo
            .count_flagged_since(
                user_id,
                now - chrono::Duration::from_std(self.config.flagged_window)
                    .map_err(|e| RiskError::Internal(e.to_string()))?,
            )
            .await?;

        let signals = RiskSignals {
            device_count,
            shared_device,
            crowded_ip,
            claims_last_hour,
            account_age_hours: (now - created_at).num_hours(),
            flagged_events,
        };

        let assessment = services::assess(&signals, &self.config);

        // Last writer wins; recomputation is idempotent
        self.repo.persist_score(user_id, assessment.score).await?;

        tracing::debug!(
            user_id = %user_id,
            score = %assessment.score,
            level = assessment.level.as_str(),
            factors = ?assessment.factors,
            "Risk evaluated"
        );

        Ok(assessment)
    }
}
