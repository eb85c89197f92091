//! Quest Limits
//!
//! Caps on how often a quest can be worked. The per-user cap is fixed at
//! one action ever, enforced by the (user, quest) unique constraint; the
//! daily cap bounds total claims on the quest per UTC day.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLimits {
    /// Max actions created on this quest since UTC midnight, any status
    #[serde(default)]
    pub daily_cap: Option<i64>,
}

impl QuestLimits {
    pub fn unlimited() -> Self {
        Self { daily_cap: None }
    }

    pub fn with_daily_cap(cap: i64) -> Self {
        Self {
            daily_cap: Some(cap),
        }
    }
}
