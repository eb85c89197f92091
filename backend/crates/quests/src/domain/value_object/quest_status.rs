//! Quest Status
//!
//! Admin-controlled lifecycle of a quest, orthogonal to the per-user
//! action state machine.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[display("draft")]
    Draft,
    #[display("active")]
    Active,
    #[display("paused")]
    Paused,
    #[display("archived")]
    Archived,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Draft => "draft",
            QuestStatus::Active => "active",
            QuestStatus::Paused => "paused",
            QuestStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(QuestStatus::Draft),
            "active" => Some(QuestStatus::Active),
            "paused" => Some(QuestStatus::Paused),
            "archived" => Some(QuestStatus::Archived),
            _ => None,
        }
    }

    pub fn is_claimable(&self) -> bool {
        matches!(self, QuestStatus::Active)
    }
}
