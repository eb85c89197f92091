//! PostgreSQL Repository Implementations
//!
//! The ledger's `grant` is the one place reward state changes hands: it
//! re-reads the action under a row lock inside the transaction that
//! writes the transition, the reward row, and the points, with the
//! commission cascade in a savepoint that may fail without rolling back
//! the primary grant.

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::{ActionId, QuestId, UserId};
use sqlx::{Acquire, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::action::QuestAction;
use crate::domain::entity::invite::Invite;
use crate::domain::entity::quest::Quest;
use crate::domain::entity::reward::Reward;
use crate::domain::entity::social_identity::{SocialIdentityBinding, VerificationCode};
use crate::domain::entity::user::User;
use crate::domain::repository::{
    ActionInsert, ActionRepository, GrantOutcome, GrantParams, LedgerRepository, QuestRepository,
    SocialIdentityRepository, UserRepository,
};
use crate::domain::services;
use crate::domain::value_object::action_status::ActionStatus;
use crate::domain::value_object::proof::ProofRecord;
use crate::domain::value_object::quest_limits::QuestLimits;
use crate::domain::value_object::quest_status::QuestStatus;
use crate::domain::value_object::quest_type::QuestType;
use crate::domain::value_object::reward_spec::RewardSpec;
use crate::error::{QuestError, QuestResult};

/// PostgreSQL-backed quest repository
#[derive(Clone)]
pub struct PgQuestRepository {
    pool: PgPool,
}

impl PgQuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired identity verification codes
    pub async fn cleanup_expired(&self) -> QuestResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted =
            sqlx::query("DELETE FROM identity_verification_codes WHERE expires_at_ms < $1")
                .bind(now_ms)
                .execute(&self.pool)
                .await?
                .rows_affected();

        tracing::info!(codes_deleted = deleted, "Cleaned up expired binding codes");

        Ok(deleted)
    }

    /// Commission cascade, inside a savepoint on the grant transaction.
    /// Returns the commission credited, if any.
    async fn cascade(
        tx: &mut Transaction<'_, Postgres>,
        invitee_id: Uuid,
        action_id: Uuid,
        params: &GrantParams,
    ) -> QuestResult<Option<i64>> {
        let mut nested = tx.begin().await?;

        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT inviter_id, invitee_id, bonus, invitee_bonus, created_at
            FROM invites
            WHERE invitee_id = $1
            "#,
        )
        .bind(invitee_id)
        .fetch_optional(&mut *nested)
        .await?;

        let Some(invite) = row.map(|r| r.into_invite()) else {
            nested.commit().await?;
            return Ok(None);
        };
        let inviter_id = invite.inviter_id.into_uuid();

        let invite_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invites WHERE inviter_id = $1")
                .bind(inviter_id)
                .fetch_one(&mut *nested)
                .await?;

        let rate_bps = services::commission_rate_bps(invite_count, &params.tiers);
        let commission = services::commission_amount(params.reward_amount, rate_bps);
        if commission <= 0 {
            nested.commit().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE invites SET bonus = bonus + $2 WHERE invitee_id = $1")
            .bind(invitee_id)
            .bind(commission)
            .execute(&mut *nested)
            .await?;

        let reward = Reward::for_commission(
            UserId::from_uuid(inviter_id),
            ActionId::from_uuid(action_id),
            commission,
            params.asset.clone(),
        );
        insert_reward(&mut nested, &reward).await?;

        nested.commit().await?;

        tracing::info!(
            inviter_id = %inviter_id,
            invitee_id = %invitee_id,
            invite_count = invite_count,
            rate_bps = rate_bps,
            commission = commission,
            "Commission cascaded"
        );

        Ok(Some(commission))
    }
}

async fn insert_reward(
    tx: &mut Transaction<'_, Postgres>,
    reward: &Reward,
) -> QuestResult<()> {
    sqlx::query(
        r#"
        INSERT INTO rewards (
            reward_id,
            user_id,
            quest_id,
            action_id,
            kind,
            amount,
            asset,
            status,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(reward.reward_id.as_uuid())
    .bind(reward.user_id.as_uuid())
    .bind(reward.quest_id.map(|q| q.into_uuid()))
    .bind(reward.action_id.map(|a| a.into_uuid()))
    .bind(reward.kind.as_str())
    .bind(reward.amount)
    .bind(&reward.asset)
    .bind(reward.status.as_str())
    .bind(reward.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgQuestRepository {
    async fn find_user(&self, user_id: UserId) -> QuestResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, points, risk_score, invited_by, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user()))
    }
}

// ============================================================================
// Quest Repository Implementation
// ============================================================================

impl QuestRepository for PgQuestRepository {
    async fn find_quest(&self, quest_id: QuestId) -> QuestResult<Option<Quest>> {
        let row = sqlx::query_as::<_, QuestRow>(
            r#"
            SELECT
                quest_id,
                title,
                quest_type,
                status,
                reward_amount,
                reward_asset,
                reward_points_override,
                daily_cap,
                channel_id,
                target,
                created_at,
                updated_at
            FROM quests
            WHERE quest_id = $1
            "#,
        )
        .bind(quest_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_quest()).transpose()
    }

    async fn count_actions_since(
        &self,
        quest_id: QuestId,
        since: DateTime<Utc>,
    ) -> QuestResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quest_actions WHERE quest_id = $1 AND claimed_at >= $2",
        )
        .bind(quest_id.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// ============================================================================
// Action Repository Implementation
// ============================================================================

impl ActionRepository for PgQuestRepository {
    async fn create(&self, action: &QuestAction) -> QuestResult<ActionInsert> {
        let proof = serde_json::to_value(&action.proof)
            .map_err(|e| QuestError::Internal(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO quest_actions (
                action_id,
                user_id,
                quest_id,
                status,
                risk_score_at_claim,
                proof,
                social_identity,
                claimed_at,
                submitted_at,
                verified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(action.action_id.as_uuid())
        .bind(action.user_id.as_uuid())
        .bind(action.quest_id.as_uuid())
        .bind(action.status.as_str())
        .bind(action.risk_score_at_claim as i16)
        .bind(proof)
        .bind(&action.social_identity)
        .bind(action.claimed_at)
        .bind(action.submitted_at)
        .bind(action.verified_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ActionInsert::Created),
            // The (user_id, quest_id) constraint closes the duplicate-
            // claim race; the violation is data, not a fault
            Err(e) if is_unique_violation(&e) => Ok(ActionInsert::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_user_and_quest(
        &self,
        user_id: UserId,
        quest_id: QuestId,
    ) -> QuestResult<Option<QuestAction>> {
        let row = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT
                action_id,
                user_id,
                quest_id,
                status,
                risk_score_at_claim,
                proof,
                social_identity,
                claimed_at,
                submitted_at,
                verified_at
            FROM quest_actions
            WHERE user_id = $1 AND quest_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(quest_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_action()).transpose()
    }

    async fn find_action(&self, action_id: ActionId) -> QuestResult<Option<QuestAction>> {
        let row = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT
                action_id,
                user_id,
                quest_id,
                status,
                risk_score_at_claim,
                proof,
                social_identity,
                claimed_at,
                submitted_at,
                verified_at
            FROM quest_actions
            WHERE action_id = $1
            "#,
        )
        .bind(action_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_action()).transpose()
    }

    async fn store_transition(&self, action: &QuestAction) -> QuestResult<()> {
        let proof = serde_json::to_value(&action.proof)
            .map_err(|e| QuestError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE quest_actions SET
                status = $2,
                proof = $3,
                social_identity = $4,
                submitted_at = $5,
                verified_at = $6
            WHERE action_id = $1
            "#,
        )
        .bind(action.action_id.as_uuid())
        .bind(action.status.as_str())
        .bind(proof)
        .bind(&action.social_identity)
        .bind(action.submitted_at)
        .bind(action.verified_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists_rewarded_for_identity(
        &self,
        quest_id: QuestId,
        external_id: &str,
    ) -> QuestResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM quest_actions
                WHERE quest_id = $1 AND social_identity = $2 AND status = 'rewarded'
            )
            "#,
        )
        .bind(quest_id.as_uuid())
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_submitted(&self, limit: i64, offset: i64) -> QuestResult<Vec<QuestAction>> {
        let rows = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT
                action_id,
                user_id,
                quest_id,
                status,
                risk_score_at_claim,
                proof,
                social_identity,
                claimed_at,
                submitted_at,
                verified_at
            FROM quest_actions
            WHERE status = 'submitted'
            ORDER BY submitted_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_action()).collect()
    }

    async fn delete_with_rewards(&self, action_id: ActionId) -> QuestResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Dependent rows first, to preserve referential integrity
        sqlx::query("DELETE FROM rewards WHERE action_id = $1")
            .bind(action_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let affected = sqlx::query("DELETE FROM quest_actions WHERE action_id = $1")
            .bind(action_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(affected > 0)
    }
}

// ============================================================================
// Ledger Repository Implementation
// ============================================================================

impl LedgerRepository for PgQuestRepository {
    async fn grant(&self, action_id: ActionId, params: &GrantParams) -> QuestResult<GrantOutcome> {
        let mut tx = self.pool.begin().await?;

        // Read-and-decide inside the writing transaction: the row lock
        // closes the race where two grants both observe "not rewarded"
        let row = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT
                action_id,
                user_id,
                quest_id,
                status,
                risk_score_at_claim,
                proof,
                social_identity,
                claimed_at,
                submitted_at,
                verified_at
            FROM quest_actions
            WHERE action_id = $1
            FOR UPDATE
            "#,
        )
        .bind(action_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let action = row.ok_or(QuestError::ActionNotFound)?.into_action()?;

        if action.status == ActionStatus::Rewarded {
            return Ok(GrantOutcome::AlreadyRewarded);
        }
        if !action.status.can_transition_to(ActionStatus::Rewarded) {
            return Err(QuestError::InvalidTransition(action.status.as_str()));
        }

        let now = Utc::now();

        sqlx::query(
            "UPDATE quest_actions SET status = 'rewarded', verified_at = $2 WHERE action_id = $1",
        )
        .bind(action_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let reward = Reward::for_quest(
            action.user_id,
            action.quest_id,
            action.action_id,
            params.reward_amount,
            params.asset.clone(),
        );
        insert_reward(&mut tx, &reward).await?;

        sqlx::query("UPDATE users SET points = points + $2, updated_at = $3 WHERE user_id = $1")
            .bind(action.user_id.as_uuid())
            .bind(params.points)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        // The cascade may fail on its own; the savepoint rolls its work
        // back while the primary grant commits untouched
        match Self::cascade(
            &mut tx,
            action.user_id.into_uuid(),
            action_id.into_uuid(),
            params,
        )
        .await
        {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    action_id = %action_id,
                    error = %e,
                    "Commission cascade failed; primary reward unaffected"
                );
            }
        }

        tx.commit().await?;

        tracing::info!(
            action_id = %action_id,
            user_id = %action.user_id,
            amount = params.reward_amount,
            points = params.points,
            "Reward granted"
        );

        Ok(GrantOutcome::Granted {
            reward,
            points_credited: params.points,
        })
    }
}

// ============================================================================
// Social Identity Repository Implementation
// ============================================================================

impl SocialIdentityRepository for PgQuestRepository {
    async fn find_binding(&self, user_id: UserId) -> QuestResult<Option<SocialIdentityBinding>> {
        let row = sqlx::query_as::<_, BindingRow>(
            r#"
            SELECT user_id, provider, external_id, bound_at
            FROM social_identities
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_binding()))
    }

    async fn save_binding(&self, binding: &SocialIdentityBinding) -> QuestResult<()> {
        sqlx::query(
            r#"
            INSERT INTO social_identities (user_id, provider, external_id, bound_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET provider = $2, external_id = $3, bound_at = $4
            "#,
        )
        .bind(binding.user_id.as_uuid())
        .bind(&binding.provider)
        .bind(&binding.external_id)
        .bind(binding.bound_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_code(&self, code: &VerificationCode) -> QuestResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identity_verification_codes (user_id, code, expires_at_ms, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET code = $2, expires_at_ms = $3, created_at = $4
            "#,
        )
        .bind(code.user_id.as_uuid())
        .bind(&code.code)
        .bind(code.expires_at_ms)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take_valid_code(&self, user_id: UserId) -> QuestResult<Option<VerificationCode>> {
        let now_ms = Utc::now().timestamp_millis();

        // Atomic consume: no double-spend of a code
        let row = sqlx::query_as::<_, CodeRow>(
            r#"
            DELETE FROM identity_verification_codes
            WHERE user_id = $1 AND expires_at_ms > $2
            RETURNING user_id, code, expires_at_ms, created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_code()))
    }

    async fn cleanup_expired_codes(&self) -> QuestResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    points: i64,
    risk_score: i16,
    invited_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            points: self.points,
            risk_score: self.risk_score.clamp(0, 100) as u8,
            invited_by: self.invited_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestRow {
    quest_id: Uuid,
    title: String,
    quest_type: String,
    status: String,
    reward_amount: i64,
    reward_asset: String,
    reward_points_override: Option<i64>,
    daily_cap: Option<i64>,
    channel_id: Option<String>,
    target: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestRow {
    fn into_quest(self) -> QuestResult<Quest> {
        let quest_type = QuestType::from_str(&self.quest_type)
            .ok_or_else(|| QuestError::Internal(format!("Invalid quest type: {}", self.quest_type)))?;
        let status = QuestStatus::from_str(&self.status)
            .ok_or_else(|| QuestError::Internal(format!("Invalid quest status: {}", self.status)))?;

        Ok(Quest {
            quest_id: QuestId::from_uuid(self.quest_id),
            title: self.title,
            quest_type,
            status,
            reward: RewardSpec {
                amount: self.reward_amount,
                asset: self.reward_asset,
                points_override: self.reward_points_override,
            },
            limits: QuestLimits {
                daily_cap: self.daily_cap,
            },
            channel_id: self.channel_id,
            target: self.target,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActionRow {
    action_id: Uuid,
    user_id: Uuid,
    quest_id: Uuid,
    status: String,
    risk_score_at_claim: i16,
    proof: serde_json::Value,
    social_identity: Option<String>,
    claimed_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
}

impl ActionRow {
    fn into_action(self) -> QuestResult<QuestAction> {
        let status = ActionStatus::from_str(&self.status).ok_or_else(|| {
            QuestError::Internal(format!("Invalid action status: {}", self.status))
        })?;
        let proof: ProofRecord = serde_json::from_value(self.proof)
            .map_err(|e| QuestError::Internal(format!("Invalid proof blob: {}", e)))?;

        Ok(QuestAction {
            action_id: ActionId::from_uuid(self.action_id),
            user_id: UserId::from_uuid(self.user_id),
            quest_id: QuestId::from_uuid(self.quest_id),
            status,
            risk_score_at_claim: self.risk_score_at_claim.clamp(0, 100) as u8,
            proof,
            social_identity: self.social_identity,
            claimed_at: self.claimed_at,
            submitted_at: self.submitted_at,
            verified_at: self.verified_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InviteRow {
    inviter_id: Uuid,
    invitee_id: Uuid,
    bonus: i64,
    invitee_bonus: i64,
    created_at: DateTime<Utc>,
}

impl InviteRow {
    fn into_invite(self) -> Invite {
        Invite {
            inviter_id: UserId::from_uuid(self.inviter_id),
            invitee_id: UserId::from_uuid(self.invitee_id),
            bonus: self.bonus,
            invitee_bonus: self.invitee_bonus,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BindingRow {
    user_id: Uuid,
    provider: String,
    external_id: String,
    bound_at: DateTime<Utc>,
}

impl BindingRow {
    fn into_binding(self) -> SocialIdentityBinding {
        SocialIdentityBinding {
            user_id: UserId::from_uuid(self.user_id),
            provider: self.provider,
            external_id: self.external_id,
            bound_at: self.bound_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CodeRow {
    user_id: Uuid,
    code: String,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
}

impl CodeRow {
    fn into_code(self) -> VerificationCode {
        VerificationCode {
            user_id: UserId::from_uuid(self.user_id),
            code: self.code,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
        }
    }
}
