//! Domain Services
//!
//! Pure risk scoring. Signals are gathered by the application layer; this
//! module only does the arithmetic, so every weight and threshold is
//! testable without storage.

use crate::application::config::RiskConfig;
use crate::domain::value_objects::{RiskAssessment, RiskLevel, RiskScore};

/// The evidence a risk evaluation runs on
#[derive(Debug, Clone, Default)]
pub struct RiskSignals {
    /// Distinct visitor ids seen for this user
    pub device_count: i64,
    /// At least one of the user's devices is shared with another user
    pub shared_device: bool,
    /// At least one of the user's IPs is shared by more users than the threshold
    pub crowded_ip: bool,
    /// Actions created in the last rolling hour
    pub claims_last_hour: i64,
    /// Account age in hours
    pub account_age_hours: i64,
    /// High/critical risk events inside the flagged window
    pub flagged_events: i64,
}

/// Sum the independent weighted signals and clamp to [0, 100].
///
/// Each signal contributes at most once; the shared-device and crowded-IP
/// signals are already first-match booleans by the time they get here.
pub fn assess(signals: &RiskSignals, config: &RiskConfig) -> RiskAssessment {
    let mut raw: u32 = 0;
    let mut factors: Vec<&'static str> = Vec::new();

    if signals.device_count > config.device_count_threshold {
        raw += config.weight_device_count;
        factors.push("device_count");
    }

    if signals.shared_device {
        raw += config.weight_shared_device;
        factors.push("shared_device");
    }

    if signals.crowded_ip {
        raw += config.weight_crowded_ip;
        factors.push("crowded_ip");
    }

    if signals.claims_last_hour > config.hourly_claim_cap {
        raw += config.weight_claim_velocity;
        factors.push("claim_velocity");
    }

    if signals.account_age_hours < config.new_account_age.as_secs() as i64 / 3600 {
        raw += config.weight_new_account;
        factors.push("new_account");
    }

    if signals.flagged_events > 0 {
        raw += config.weight_per_flagged_event * signals.flagged_events.max(0) as u32;
        factors.push("recent_flags");
    }

    let score = RiskScore::from_raw(raw);
    let should_block = score.value() >= config.block_threshold;
    let level = if score.value() >= config.block_threshold {
        RiskLevel::High
    } else if score.value() >= config.warn_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        score,
        level,
        factors,
        should_block,
    }
}
