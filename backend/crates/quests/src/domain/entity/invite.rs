//! Invite entity
//!
//! An invitee is invited at most once, ever, by exactly one inviter;
//! the unique constraint on invitee_id is load-bearing.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

#[derive(Debug, Clone)]
pub struct Invite {
    pub inviter_id: UserId,
    pub invitee_id: UserId,
    /// Cumulative inviter-side commission
    pub bonus: i64,
    /// One-time signup reward for the invitee
    pub invitee_bonus: i64,
    pub created_at: DateTime<Utc>,
}
