//! Review Action Use Case
//!
//! The admin decision point for queued submissions. Approve goes through
//! the same ledger as auto-approval; the grant re-checks the action's
//! state under lock, so two concurrent approvals produce one reward.

use std::sync::Arc;

use kernel::id::ActionId;
use uuid::Uuid;

use crate::application::config::QuestConfig;
use crate::application::submit_proof::grant_params;
use crate::domain::entity::action::QuestAction;
use crate::domain::repository::{
    ActionRepository, GrantOutcome, LedgerRepository, QuestRepository,
};
use crate::domain::value_object::action_status::ActionStatus;
use crate::error::{QuestError, QuestResult};
use crate::notify::Notifier;

/// Outcome of an admin approval
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Rewarded { amount: i64, points: i64 },
    /// A concurrent approval got there first; nothing was written
    AlreadyRewarded,
}

/// Review Action Use Case
pub struct ReviewActionUseCase<R>
where
    R: QuestRepository + ActionRepository + LedgerRepository,
{
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
    config: Arc<QuestConfig>,
}

impl<R> ReviewActionUseCase<R>
where
    R: QuestRepository + ActionRepository + LedgerRepository,
{
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>, config: Arc<QuestConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    pub async fn approve(&self, action_id: Uuid) -> QuestResult<ReviewOutcome> {
        let action_id = ActionId::from_uuid(action_id);

        let action = self
            .repo
            .find_action(action_id)
            .await?
            .ok_or(QuestError::ActionNotFound)?;

        match action.status {
            ActionStatus::Submitted => {}
            ActionStatus::Rewarded => return Ok(ReviewOutcome::AlreadyRewarded),
            _ => return Err(QuestError::InvalidTransition(action.status.as_str())),
        }

        let quest = self
            .repo
            .find_quest(action.quest_id)
            .await?
            .ok_or(QuestError::QuestNotFound)?;

        let params = grant_params(&quest, &self.config);
        match self.repo.grant(action_id, &params).await? {
            GrantOutcome::Granted {
                reward,
                points_credited,
            } => {
                tracing::info!(
                    action_id = %action_id,
                    user_id = %action.user_id,
                    amount = reward.amount,
                    "Action approved by admin"
                );

                if let Err(e) = self
                    .notifier
                    .notify_reward_granted(action.user_id, &quest.title, reward.amount, &reward.asset)
                    .await
                {
                    tracing::warn!(error = %e, "Reward notification failed");
                }

                Ok(ReviewOutcome::Rewarded {
                    amount: reward.amount,
                    points: points_credited,
                })
            }
            GrantOutcome::AlreadyRewarded => Ok(ReviewOutcome::AlreadyRewarded),
        }
    }

    pub async fn reject(&self, action_id: Uuid, reason: String) -> QuestResult<()> {
        let action_id = ActionId::from_uuid(action_id);

        let mut action = self
            .repo
            .find_action(action_id)
            .await?
            .ok_or(QuestError::ActionNotFound)?;

        if action.status != ActionStatus::Submitted {
            return Err(QuestError::InvalidTransition(action.status.as_str()));
        }

        action.reject(reason)?;
        self.repo.store_transition(&action).await?;

        tracing::info!(action_id = %action_id, "Action rejected by admin");
        Ok(())
    }

    /// Re-open a rejected action into the review queue
    pub async fn reopen(&self, action_id: Uuid) -> QuestResult<()> {
        let action_id = ActionId::from_uuid(action_id);

        let mut action = self
            .repo
            .find_action(action_id)
            .await?
            .ok_or(QuestError::ActionNotFound)?;

        action.reopen()?;
        self.repo.store_transition(&action).await?;

        tracing::info!(action_id = %action_id, "Action re-opened by admin");
        Ok(())
    }

    /// Review queue, oldest submissions first
    pub async fn list_queue(&self, offset: i64) -> QuestResult<Vec<QuestAction>> {
        self.repo
            .list_submitted(self.config.review_queue_page, offset)
            .await
    }

    /// Admin hard-delete; cascades dependent rewards first
    pub async fn hard_delete(&self, action_id: Uuid) -> QuestResult<()> {
        let action_id = ActionId::from_uuid(action_id);
        let existed = self.repo.delete_with_rewards(action_id).await?;
        if !existed {
            return Err(QuestError::ActionNotFound);
        }
        tracing::warn!(action_id = %action_id, "Action hard-deleted by admin");
        Ok(())
    }
}
