//! User entity
//!
//! Created on first authentication (outside this core) and never deleted.
//! This crate mutates only the points counter (through the ledger) and
//! reads the inviter reference; the risk score is recomputed by the risk
//! crate.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Accumulated points, credited by the reward ledger
    pub points: i64,
    /// Recomputed risk score, clamped to [0, 100]
    pub risk_score: u8,
    /// Set once at signup, immutable thereafter
    pub invited_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
