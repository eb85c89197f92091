//! Application Configuration
//!
//! Risk weights, thresholds, and claim rate windows. The numbers are
//! product decisions, not laws: defaults pin the current values and tests
//! exercise tier boundaries by constructing their own configs.

use std::time::Duration;

pub use platform::rate_limit::RateLimitConfig;

use crate::domain::value_objects::RateWindow;

/// Risk evaluator configuration
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Added when the user's distinct device count exceeds the threshold
    pub weight_device_count: u32,
    /// Added once when any device is shared with another user
    pub weight_shared_device: u32,
    /// Added once when any IP is shared by more than `ip_user_threshold` users
    pub weight_crowded_ip: u32,
    /// Added when claims in the last hour exceed the hourly cap
    pub weight_claim_velocity: u32,
    /// Added when the account is younger than `new_account_age`
    pub weight_new_account: u32,
    /// Added per high/critical risk event inside `flagged_window`
    pub weight_per_flagged_event: u32,
    /// Device count above which `weight_device_count` applies
    pub device_count_threshold: i64,
    /// Users per IP above which `weight_crowded_ip` applies
    pub ip_user_threshold: i64,
    /// Hourly claim count above which `weight_claim_velocity` applies
    pub hourly_claim_cap: i64,
    /// Accounts younger than this are scored as new
    pub new_account_age: Duration,
    /// Lookback window for flagged risk events
    pub flagged_window: Duration,
    /// Score at or above which the level is medium
    pub warn_threshold: u8,
    /// Score at or above which admission is blocked
    pub block_threshold: u8,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weight_device_count: 15,
            weight_shared_device: 25,
            weight_crowded_ip: 20,
            weight_claim_velocity: 30,
            weight_new_account: 10,
            weight_per_flagged_event: 5,
            device_count_threshold: 3,
            ip_user_threshold: 5,
            hourly_claim_cap: 20,
            new_account_age: Duration::from_secs(24 * 3600),
            flagged_window: Duration::from_secs(7 * 24 * 3600),
            warn_threshold: 50,
            block_threshold: 80,
        }
    }
}

/// Sliding windows for the `quest_claim` action
#[derive(Debug, Clone)]
pub struct ClaimRateConfig {
    pub per_minute: RateLimitConfig,
    pub per_hour: RateLimitConfig,
    pub per_day: RateLimitConfig,
}

impl Default for ClaimRateConfig {
    fn default() -> Self {
        Self {
            per_minute: RateLimitConfig::new(5, 60),
            per_hour: RateLimitConfig::new(20, 3600),
            per_day: RateLimitConfig::new(50, 86400),
        }
    }
}

impl ClaimRateConfig {
    /// Windows in checking order; the first exceeded one short-circuits
    pub fn windows(&self) -> [(RateWindow, &RateLimitConfig); 3] {
        [
            (RateWindow::Minute, &self.per_minute),
            (RateWindow::Hour, &self.per_hour),
            (RateWindow::Day, &self.per_day),
        ]
    }
}
