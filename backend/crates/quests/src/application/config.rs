//! Application Configuration
//!
//! Commission tiers, points conversion, and binding-code TTL. The tier
//! boundaries and the points rate are product decisions hoisted out of
//! the code paths; defaults pin the current values.

use std::time::Duration;

pub use crate::domain::services::CommissionTiers;

/// Quest application configuration
#[derive(Debug, Clone)]
pub struct QuestConfig {
    /// Points per minor unit when a quest has no points override
    pub points_per_unit: i64,
    /// Asset code used when a quest does not name one
    pub default_asset: String,
    pub commission: CommissionTiers,
    /// AI classification confidence needed for auto-approval
    pub screenshot_confidence_threshold: f32,
    /// TTL of identity binding codes
    pub binding_code_ttl: Duration,
    /// Page size of the admin review queue
    pub review_queue_page: i64,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            points_per_unit: 10,
            default_asset: "USDT".to_string(),
            commission: CommissionTiers::default(),
            screenshot_confidence_threshold: 0.8,
            binding_code_ttl: Duration::from_secs(600),
            review_queue_page: 50,
        }
    }
}

impl QuestConfig {
    pub fn binding_code_ttl_ms(&self) -> i64 {
        self.binding_code_ttl.as_millis() as i64
    }
}
