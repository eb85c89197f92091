//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{ActionId, QuestId, UserId};

use crate::domain::entity::action::QuestAction;
use crate::domain::entity::quest::Quest;
use crate::domain::entity::reward::Reward;
use crate::domain::entity::social_identity::{SocialIdentityBinding, VerificationCode};
use crate::domain::entity::user::User;
use crate::domain::services::CommissionTiers;
use crate::error::QuestResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_user(&self, user_id: UserId) -> QuestResult<Option<User>>;
}

/// Quest repository trait
#[trait_variant::make(QuestRepository: Send)]
pub trait LocalQuestRepository {
    async fn find_quest(&self, quest_id: QuestId) -> QuestResult<Option<Quest>>;

    /// Actions created on this quest since `since`, any status (daily cap)
    async fn count_actions_since(&self, quest_id: QuestId, since: DateTime<Utc>)
    -> QuestResult<i64>;
}

/// Outcome of an action insert against the (user, quest) unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionInsert {
    Created,
    /// The constraint fired: this (user, quest) already has an action
    Duplicate,
}

/// Action repository trait
#[trait_variant::make(ActionRepository: Send)]
pub trait LocalActionRepository {
    /// Insert a new action. The storage-level unique constraint on
    /// (user_id, quest_id) closes the duplicate-claim race; a violation
    /// comes back as `Duplicate`, never as an error.
    async fn create(&self, action: &QuestAction) -> QuestResult<ActionInsert>;

    async fn find_by_user_and_quest(
        &self,
        user_id: UserId,
        quest_id: QuestId,
    ) -> QuestResult<Option<QuestAction>>;

    async fn find_action(&self, action_id: ActionId) -> QuestResult<Option<QuestAction>>;

    /// Persist a state transition (status, proof, timestamps, identity)
    async fn store_transition(&self, action: &QuestAction) -> QuestResult<()>;

    /// Whether any rewarded action on this quest already used the identity
    async fn exists_rewarded_for_identity(
        &self,
        quest_id: QuestId,
        external_id: &str,
    ) -> QuestResult<bool>;

    /// Review queue: submitted actions, oldest first
    async fn list_submitted(&self, limit: i64, offset: i64) -> QuestResult<Vec<QuestAction>>;

    /// Admin hard-delete; dependent reward rows go first to preserve
    /// referential integrity. Returns whether the action existed.
    async fn delete_with_rewards(&self, action_id: ActionId) -> QuestResult<bool>;
}

/// Everything the ledger needs to know besides the action itself
#[derive(Debug, Clone)]
pub struct GrantParams {
    /// Primary reward amount in minor units
    pub reward_amount: i64,
    pub asset: String,
    /// Points credited to the user
    pub points: i64,
    /// Commission tiers for the cascade
    pub tiers: CommissionTiers,
}

/// Outcome of a grant
#[derive(Debug, Clone)]
pub enum GrantOutcome {
    Granted {
        reward: Reward,
        points_credited: i64,
    },
    /// The action was already rewarded; nothing was written
    AlreadyRewarded,
}

/// The reward ledger: the one atomic unit of the pipeline.
///
/// `grant` must, inside a single transaction: re-read the action under
/// lock, exit idempotently if it is already REWARDED, transition it,
/// insert exactly one reward row, credit the user's points, and run the
/// commission cascade in a nested transaction whose failure is logged
/// and swallowed. A fault in the primary steps rolls everything back.
#[trait_variant::make(LedgerRepository: Send)]
pub trait LocalLedgerRepository {
    async fn grant(&self, action_id: ActionId, params: &GrantParams) -> QuestResult<GrantOutcome>;
}

/// Social identity repository trait
#[trait_variant::make(SocialIdentityRepository: Send)]
pub trait LocalSocialIdentityRepository {
    /// The bound external identity for a user, if any
    async fn find_binding(&self, user_id: UserId) -> QuestResult<Option<SocialIdentityBinding>>;

    /// Upsert a binding (re-binding replaces the previous identity)
    async fn save_binding(&self, binding: &SocialIdentityBinding) -> QuestResult<()>;

    /// Upsert the pending verification code for a user
    async fn put_code(&self, code: &VerificationCode) -> QuestResult<()>;

    /// Atomically consume the user's code if present and unexpired
    async fn take_valid_code(&self, user_id: UserId) -> QuestResult<Option<VerificationCode>>;

    /// Delete expired codes (startup hygiene)
    async fn cleanup_expired_codes(&self) -> QuestResult<u64>;
}
