//! Submit Proof Use Case
//!
//! Drives a claimed action through verification. Verification runs before
//! any transaction is opened; only a verdict reaches the ledger. A
//! transient provider failure leaves the action exactly as it was and the
//! caller is told to retry.

use std::sync::Arc;

use kernel::id::{QuestId, UserId};
use uuid::Uuid;

use crate::application::config::QuestConfig;
use crate::domain::entity::quest::Quest;
use crate::domain::repository::{
    ActionRepository, GrantOutcome, GrantParams, LedgerRepository, QuestRepository,
    SocialIdentityRepository,
};
use crate::domain::services;
use crate::domain::value_object::action_status::ActionStatus;
use crate::domain::value_object::proof::ProofPayload;
use crate::error::{QuestError, QuestResult};
use crate::notify::Notifier;
use crate::verifier::registry::VerifierRegistry;
use crate::verifier::{VerificationRequest, Verdict, VerifierError};

/// Input DTO for submit
#[derive(Debug)]
pub struct SubmitProofInput {
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub payload: Option<ProofPayload>,
}

/// Outcome of a submission
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Auto-approved and granted in this call
    Rewarded { amount: i64, points: i64 },
    /// Idempotent repeat on an already-rewarded action; nothing changed
    AlreadyRewarded,
    /// Stored and queued for admin review
    PendingReview,
    /// Deterministic verification failure
    Rejected {
        message: String,
        resubmittable: bool,
    },
}

/// Submit Proof Use Case
pub struct SubmitProofUseCase<R>
where
    R: QuestRepository + ActionRepository + LedgerRepository + SocialIdentityRepository,
{
    repo: Arc<R>,
    registry: Arc<VerifierRegistry>,
    notifier: Arc<dyn Notifier>,
    config: Arc<QuestConfig>,
}

impl<R> SubmitProofUseCase<R>
where
    R: QuestRepository + ActionRepository + LedgerRepository + SocialIdentityRepository,
{
    pub fn new(
        repo: Arc<R>,
        registry: Arc<VerifierRegistry>,
        notifier: Arc<dyn Notifier>,
        config: Arc<QuestConfig>,
    ) -> Self {
        Self {
            repo,
            registry,
            notifier,
            config,
        }
    }

    pub async fn execute(&self, input: SubmitProofInput) -> QuestResult<SubmitOutcome> {
        let quest_id = QuestId::from_uuid(input.quest_id);
        let user_id = UserId::from_uuid(input.user_id);

        let quest = self
            .repo
            .find_quest(quest_id)
            .await?
            .ok_or(QuestError::QuestNotFound)?;

        let mut action = self
            .repo
            .find_by_user_and_quest(user_id, quest_id)
            .await?
            .ok_or(QuestError::ActionNotFound)?;

        match action.status {
            // Client retries after a reward must not re-grant
            ActionStatus::Rewarded => return Ok(SubmitOutcome::AlreadyRewarded),
            ActionStatus::Rejected => {
                return Err(QuestError::InvalidTransition(action.status.as_str()));
            }
            ActionStatus::Claimed | ActionStatus::Submitted => {}
        }

        if let Some(payload) = &input.payload {
            if !payload.matches(quest.quest_type) {
                return Err(QuestError::InvalidProof(format!(
                    "payload does not match quest type {}",
                    quest.quest_type
                )));
            }
        }

        let verifier = self.registry.get(quest.quest_type).ok_or_else(|| {
            QuestError::Internal(format!("no verifier for quest type {}", quest.quest_type))
        })?;

        // Identity-bound quests: resolve the binding and enforce one
        // rewarded action per (quest, identity) before verification runs
        let external_id = if verifier.requires_social_identity() {
            let binding = self
                .repo
                .find_binding(user_id)
                .await?
                .ok_or(QuestError::IdentityNotBound)?;

            if self
                .repo
                .exists_rewarded_for_identity(quest_id, &binding.external_id)
                .await?
            {
                return Err(QuestError::IdentityAlreadyRewarded);
            }

            Some(binding.external_id)
        } else {
            None
        };

        // No transaction is open across this call; a timeout leaves the
        // action in its pre-call state
        let verdict = verifier
            .verify(VerificationRequest {
                user_id,
                quest: &quest,
                payload: input.payload.as_ref(),
                external_id: external_id.as_deref(),
            })
            .await
            .map_err(|e| match e {
                VerifierError::Transient(msg) => QuestError::VerificationUnavailable(msg),
                VerifierError::Misconfigured(msg) => QuestError::Internal(msg),
            })?;

        match verdict {
            Verdict::Approved { message } => {
                action.record_submission(input.payload, message, external_id)?;
                self.repo.store_transition(&action).await?;

                let params = grant_params(&quest, &self.config);
                match self.repo.grant(action.action_id, &params).await? {
                    GrantOutcome::Granted {
                        reward,
                        points_credited,
                    } => {
                        // Fire-and-forget; a notification failure never
                        // touches the reward
                        if let Err(e) = self
                            .notifier
                            .notify_reward_granted(
                                user_id,
                                &quest.title,
                                reward.amount,
                                &reward.asset,
                            )
                            .await
                        {
                            tracing::warn!(error = %e, "Reward notification failed");
                        }

                        Ok(SubmitOutcome::Rewarded {
                            amount: reward.amount,
                            points: points_credited,
                        })
                    }
                    GrantOutcome::AlreadyRewarded => Ok(SubmitOutcome::AlreadyRewarded),
                }
            }
            Verdict::NeedsReview { message } => {
                action.record_submission(input.payload, message, external_id)?;
                self.repo.store_transition(&action).await?;

                tracing::info!(
                    action_id = %action.action_id,
                    quest_id = %input.quest_id,
                    "Submission queued for review"
                );
                Ok(SubmitOutcome::PendingReview)
            }
            Verdict::Rejected { message } => {
                if verifier.one_shot() {
                    action.reject(message.clone())?;
                    self.repo.store_transition(&action).await?;
                    Ok(SubmitOutcome::Rejected {
                        message,
                        resubmittable: false,
                    })
                } else {
                    // Terminal for this attempt only; the action stays
                    // where it was and can be resubmitted
                    action.record_failed_attempt(message.clone());
                    self.repo.store_transition(&action).await?;
                    Ok(SubmitOutcome::Rejected {
                        message,
                        resubmittable: true,
                    })
                }
            }
        }
    }
}

/// Everything the ledger needs, derived from the quest's reward spec
pub fn grant_params(quest: &Quest, config: &QuestConfig) -> GrantParams {
    GrantParams {
        reward_amount: quest.reward.amount,
        asset: if quest.reward.asset.is_empty() {
            config.default_asset.clone()
        } else {
            quest.reward.asset.clone()
        },
        points: services::points_for(&quest.reward, config.points_per_unit),
        tiers: config.commission.clone(),
    }
}
