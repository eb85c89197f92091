//! Reward Specification
//!
//! What a quest pays out. Amounts are integer minor units so commission
//! and points math stays exact.

use serde::{Deserialize, Serialize};

/// Kind of a reward row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// The primary quest payout
    Quest,
    /// Inviter commission from the cascade
    Commission,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::Quest => "quest",
            RewardKind::Commission => "commission",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "quest" => Some(RewardKind::Quest),
            "commission" => Some(RewardKind::Commission),
            _ => None,
        }
    }
}

/// Settlement status of a reward row; payout itself is an external sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    Pending,
    Paid,
}

impl RewardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardStatus::Pending => "pending",
            RewardStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RewardStatus::Pending),
            "paid" => Some(RewardStatus::Paid),
            _ => None,
        }
    }
}

/// A quest's configured payout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSpec {
    /// Amount in minor units of `asset`
    pub amount: i64,
    /// Asset code, e.g. "USDT"
    pub asset: String,
    /// Explicit points value; when unset, points default to
    /// amount x points_per_unit
    #[serde(default)]
    pub points_override: Option<i64>,
}

impl RewardSpec {
    pub fn new(amount: i64, asset: impl Into<String>) -> Self {
        Self {
            amount,
            asset: asset.into(),
            points_override: None,
        }
    }
}
