//! Track Client Use Case
//!
//! Records the (visitor id, user) and (ip, user) observations that the
//! risk evaluator later reads. Pure evidence collection; no decisions.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::DeviceFingerprint;
use crate::domain::repository::{FingerprintRepository, IpActivityRepository};
use crate::error::RiskResult;

/// Input for tracking a client observation
#[derive(Debug, Clone)]
pub struct TrackClientInput {
    pub user_id: Uuid,
    pub visitor_id: Option<String>,
    pub attributes: serde_json::Value,
    pub ip: Option<String>,
}

/// Track Client Use Case
pub struct TrackClientUseCase<R>
where
    R: FingerprintRepository + IpActivityRepository,
{
    repo: Arc<R>,
}

impl<R> TrackClientUseCase<R>
where
    R: FingerprintRepository + IpActivityRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: TrackClientInput) -> RiskResult<()> {
        if let Some(visitor_id) = &input.visitor_id {
            let fingerprint = DeviceFingerprint::new(
                visitor_id.clone(),
                input.user_id,
                input.attributes.clone(),
            );
            self.repo.upsert_fingerprint(&fingerprint).await?;
        }

        if let Some(ip) = &input.ip {
            self.repo.record_ip(ip, input.user_id).await?;
        }

        tracing::debug!(
            user_id = %input.user_id,
            has_visitor_id = input.visitor_id.is_some(),
            has_ip = input.ip.is_some(),
            "Client observation recorded"
        );

        Ok(())
    }
}
