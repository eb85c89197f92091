//! Manage Blacklist Use Case
//!
//! Admin add/remove and manual score override. Every mutation here is an
//! explicit human decision, so each one is written to the risk event log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{BlacklistEntry, RiskEvent, event_types};
use crate::domain::repository::{BlacklistRepository, RiskEventRepository, UserRiskRepository};
use crate::domain::value_objects::{BlacklistSubject, RiskScore, Severity};
use crate::error::{RiskError, RiskResult};

/// Manage Blacklist Use Case
pub struct ManageBlacklistUseCase<R>
where
    R: BlacklistRepository + RiskEventRepository + UserRiskRepository,
{
    repo: Arc<R>,
}

impl<R> ManageBlacklistUseCase<R>
where
    R: BlacklistRepository + RiskEventRepository + UserRiskRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Upsert an entry: re-adding a subject updates reason and expiry
    pub async fn add(
        &self,
        subject: BlacklistSubject,
        reason: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> RiskResult<()> {
        let entry = BlacklistEntry::new(subject.clone(), reason.clone(), expires_at);
        self.repo.upsert_entry(&entry).await?;

        let event = RiskEvent::new(event_types::BLACKLIST_ADDED, Severity::High).with_details(
            serde_json::json!({
                "subjectType": subject.kind_str(),
                "value": subject.value_string(),
                "reason": reason,
                "expiresAtMs": expires_at.map(|t| t.timestamp_millis()),
            }),
        );
        self.repo.append_event(&event).await?;

        tracing::info!(
            subject_type = subject.kind_str(),
            value = %subject.value_string(),
            "Blacklist entry added"
        );
        Ok(())
    }

    /// Remove an entry; missing entries are reported as not found
    pub async fn remove(&self, subject: BlacklistSubject) -> RiskResult<()> {
        let removed = self.repo.remove_entry(&subject).await?;
        if !removed {
            return Err(RiskError::InvalidSubject(format!(
                "no blacklist entry for {} {}",
                subject.kind_str(),
                subject.value_string()
            )));
        }

        let event = RiskEvent::new(event_types::BLACKLIST_REMOVED, Severity::Medium).with_details(
            serde_json::json!({
                "subjectType": subject.kind_str(),
                "value": subject.value_string(),
            }),
        );
        self.repo.append_event(&event).await?;

        tracing::info!(
            subject_type = subject.kind_str(),
            value = %subject.value_string(),
            "Blacklist entry removed"
        );
        Ok(())
    }

    /// Manual score override. The score field is otherwise only written by
    /// recomputation, so the override itself goes into the audit trail.
    pub async fn override_score(
        &self,
        user_id: Uuid,
        score: RiskScore,
        note: Option<String>,
    ) -> RiskResult<()> {
        self.repo.persist_score(user_id, score).await?;

        let event = RiskEvent::new(event_types::SCORE_OVERRIDDEN, Severity::High)
            .with_user(user_id)
            .with_details(serde_json::json!({
                "score": score.value(),
                "note": note,
            }));
        self.repo.append_event(&event).await?;

        tracing::info!(user_id = %user_id, score = %score, "Risk score overridden");
        Ok(())
    }
}
