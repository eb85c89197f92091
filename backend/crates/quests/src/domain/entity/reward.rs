//! Reward entity
//!
//! Immutable once created. Exactly one quest-kind row exists per rewarded
//! action; commission rows reference the same action through the cascade.

use chrono::{DateTime, Utc};
use kernel::id::{ActionId, QuestId, RewardId, UserId};

use crate::domain::value_object::reward_spec::{RewardKind, RewardStatus};

#[derive(Debug, Clone)]
pub struct Reward {
    pub reward_id: RewardId,
    pub user_id: UserId,
    pub quest_id: Option<QuestId>,
    pub action_id: Option<ActionId>,
    pub kind: RewardKind,
    /// Minor units of `asset`
    pub amount: i64,
    pub asset: String,
    pub status: RewardStatus,
    pub created_at: DateTime<Utc>,
}

impl Reward {
    /// The primary payout for a rewarded action
    pub fn for_quest(
        user_id: UserId,
        quest_id: QuestId,
        action_id: ActionId,
        amount: i64,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            reward_id: RewardId::new(),
            user_id,
            quest_id: Some(quest_id),
            action_id: Some(action_id),
            kind: RewardKind::Quest,
            amount,
            asset: asset.into(),
            status: RewardStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// An inviter commission credited by the cascade
    pub fn for_commission(
        inviter_id: UserId,
        action_id: ActionId,
        amount: i64,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            reward_id: RewardId::new(),
            user_id: inviter_id,
            quest_id: None,
            action_id: Some(action_id),
            kind: RewardKind::Commission,
            amount,
            asset: asset.into(),
            status: RewardStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
