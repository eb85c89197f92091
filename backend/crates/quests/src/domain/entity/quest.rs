//! Quest entity

use chrono::{DateTime, Utc};
use kernel::id::QuestId;

use crate::domain::value_object::quest_limits::QuestLimits;
use crate::domain::value_object::quest_status::QuestStatus;
use crate::domain::value_object::quest_type::QuestType;
use crate::domain::value_object::reward_spec::RewardSpec;

/// A quest as configured by an admin. Status transitions are admin-only
/// and orthogonal to the per-user action state machine.
#[derive(Debug, Clone)]
pub struct Quest {
    pub quest_id: QuestId,
    pub title: String,
    pub quest_type: QuestType,
    pub status: QuestStatus,
    pub reward: RewardSpec,
    pub limits: QuestLimits,
    /// Channel id for membership quests
    pub channel_id: Option<String>,
    /// Target account handle or post URL for engagement quests
    pub target: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quest {
    pub fn is_claimable(&self) -> bool {
        self.status.is_claimable()
    }
}
