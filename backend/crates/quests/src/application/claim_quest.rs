//! Claim Quest Use Case
//!
//! Admission through the gatekeeper, quest/cap checks, then an insert
//! against the (user, quest) unique constraint. A denied claim leaves no
//! trace besides the gatekeeper's own risk events; a duplicate claim
//! returns the existing action.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{QuestId, UserId};
use risk::application::gatekeeper::{AdmissionContext, GatekeeperUseCase};
use risk::domain::repository::{
    BlacklistRepository, ClaimActivityRepository, FingerprintRepository, IpActivityRepository,
    RiskEventRepository, UserRiskRepository,
};
use risk::domain::value_objects::AdmissionDecision;
use uuid::Uuid;

use crate::domain::entity::action::QuestAction;
use crate::domain::repository::{ActionInsert, ActionRepository, QuestRepository};
use crate::error::{QuestError, QuestResult};

/// Admission seam, so the claim path is testable without the risk stores
#[trait_variant::make(AdmissionGate: Send)]
pub trait LocalAdmissionGate {
    async fn decide(&self, ctx: &AdmissionContext) -> Result<AdmissionDecision, risk::RiskError>;
}

impl<RR> AdmissionGate for GatekeeperUseCase<RR>
where
    RR: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Send
        + Sync,
{
    async fn decide(&self, ctx: &AdmissionContext) -> Result<AdmissionDecision, risk::RiskError> {
        GatekeeperUseCase::decide(self, ctx).await
    }
}

/// Input DTO for claim
#[derive(Debug, Clone)]
pub struct ClaimQuestInput {
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub ip: Option<String>,
    pub visitor_id: Option<String>,
}

/// Outcome of a claim; denials are data, not errors
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Claimed(QuestAction),
    /// Idempotent repeat: the existing action, untouched
    AlreadyClaimed(QuestAction),
    Denied {
        reason: String,
        score: Option<u8>,
    },
}

/// Claim Quest Use Case
pub struct ClaimQuestUseCase<R, G>
where
    R: QuestRepository + ActionRepository,
    G: AdmissionGate,
{
    repo: Arc<R>,
    gate: Arc<G>,
}

impl<R, G> ClaimQuestUseCase<R, G>
where
    R: QuestRepository + ActionRepository,
    G: AdmissionGate,
{
    pub fn new(repo: Arc<R>, gate: Arc<G>) -> Self {
        Self { repo, gate }
    }

    pub async fn execute(&self, input: ClaimQuestInput) -> QuestResult<ClaimOutcome> {
        let decision = self
            .gate
            .decide(&AdmissionContext {
                user_id: input.user_id,
                ip: input.ip.clone(),
                visitor_id: input.visitor_id.clone(),
            })
            .await?;

        if !decision.allowed {
            return Ok(ClaimOutcome::Denied {
                reason: decision
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "claim denied".to_string()),
                score: decision.score.map(|s| s.value()),
            });
        }

        let quest_id = QuestId::from_uuid(input.quest_id);
        let user_id = UserId::from_uuid(input.user_id);

        let quest = self
            .repo
            .find_quest(quest_id)
            .await?
            .ok_or(QuestError::QuestNotFound)?;

        if !quest.is_claimable() {
            return Err(QuestError::QuestNotActive);
        }

        if let Some(cap) = quest.limits.daily_cap {
            let midnight = Utc::now()
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|t| t.and_utc())
                .ok_or_else(|| QuestError::Internal("invalid midnight".to_string()))?;
            let today = self.repo.count_actions_since(quest_id, midnight).await?;
            if today >= cap {
                return Ok(ClaimOutcome::Denied {
                    reason: "quest daily cap reached".to_string(),
                    score: decision.score.map(|s| s.value()),
                });
            }
        }

        let score_at_claim = decision.score.map(|s| s.value()).unwrap_or(0);
        let action = QuestAction::claim(user_id, quest_id, score_at_claim);

        match self.repo.create(&action).await? {
            ActionInsert::Created => {
                tracing::info!(
                    user_id = %input.user_id,
                    quest_id = %input.quest_id,
                    action_id = %action.action_id,
                    risk_score = score_at_claim,
                    "Quest claimed"
                );
                Ok(ClaimOutcome::Claimed(action))
            }
            ActionInsert::Duplicate => {
                // The unique constraint fired under a concurrent claim;
                // surface the winner's state
                let existing = self
                    .repo
                    .find_by_user_and_quest(user_id, quest_id)
                    .await?
                    .ok_or_else(|| {
                        QuestError::Internal("duplicate claim but no action row".to_string())
                    })?;
                Ok(ClaimOutcome::AlreadyClaimed(existing))
            }
        }
    }
}
