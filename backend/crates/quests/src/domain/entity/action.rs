//! Quest Action entity
//!
//! The per-(user, quest) aggregate. Mutated only through the transition
//! methods below; the status field itself stays private to this module's
//! callers via those guards.

use chrono::{DateTime, Utc};
use kernel::id::{ActionId, QuestId, UserId};

use crate::domain::value_object::action_status::ActionStatus;
use crate::domain::value_object::proof::{ProofPayload, ProofRecord};
use crate::error::{QuestError, QuestResult};

#[derive(Debug, Clone)]
pub struct QuestAction {
    pub action_id: ActionId,
    pub user_id: UserId,
    pub quest_id: QuestId,
    pub status: ActionStatus,
    /// Gatekeeper score at admission, kept for audit
    pub risk_score_at_claim: u8,
    pub proof: ProofRecord,
    /// External identity captured at submission, the key of the
    /// one-reward-per-identity rule
    pub social_identity: Option<String>,
    pub claimed_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl QuestAction {
    /// Create a freshly claimed action
    pub fn claim(user_id: UserId, quest_id: QuestId, risk_score_at_claim: u8) -> Self {
        Self {
            action_id: ActionId::new(),
            user_id,
            quest_id,
            status: ActionStatus::Claimed,
            risk_score_at_claim,
            proof: ProofRecord::default(),
            social_identity: None,
            claimed_at: Utc::now(),
            submitted_at: None,
            verified_at: None,
        }
    }

    /// Record a submission and move to SUBMITTED
    pub fn record_submission(
        &mut self,
        payload: Option<ProofPayload>,
        verifier_message: Option<String>,
        social_identity: Option<String>,
    ) -> QuestResult<()> {
        if !self.status.can_transition_to(ActionStatus::Submitted) {
            return Err(QuestError::InvalidTransition(self.status.as_str()));
        }
        self.status = ActionStatus::Submitted;
        self.proof.payload = payload;
        self.proof.verifier_message = verifier_message;
        self.social_identity = social_identity;
        self.submitted_at = Some(Utc::now());
        Ok(())
    }

    /// Record a failed verification attempt without leaving the current
    /// state; the action stays resubmittable.
    pub fn record_failed_attempt(&mut self, message: String) {
        self.proof.verifier_message = Some(message);
    }

    /// Move to REJECTED, keeping the reason for audit
    pub fn reject(&mut self, reason: String) -> QuestResult<()> {
        if !self.status.can_transition_to(ActionStatus::Rejected) {
            return Err(QuestError::InvalidTransition(self.status.as_str()));
        }
        self.status = ActionStatus::Rejected;
        self.proof.review_reason = Some(reason);
        Ok(())
    }

    /// Admin re-open: REJECTED back into the review queue
    pub fn reopen(&mut self) -> QuestResult<()> {
        if self.status != ActionStatus::Rejected {
            return Err(QuestError::InvalidTransition(self.status.as_str()));
        }
        self.status = ActionStatus::Submitted;
        self.proof.review_reason = None;
        Ok(())
    }

    pub fn is_rewarded(&self) -> bool {
        self.status == ActionStatus::Rewarded
    }
}
