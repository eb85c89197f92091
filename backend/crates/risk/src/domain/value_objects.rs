//! Domain Value Objects
//!
//! Immutable value types for the risk domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk score, clamped to [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MAX: u8 = 100;

    /// Create a score from an unclamped signal sum
    pub fn from_raw(raw: u32) -> Self {
        Self(raw.min(Self::MAX as u32) as u8)
    }

    /// Create from a stored value, clamping defensively
    pub fn from_stored(value: i16) -> Self {
        Self(value.clamp(0, Self::MAX as i16) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk level derived from the score and the configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Severity of a risk event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// High and critical events count toward the risk score
    pub fn is_flagged(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    /// All severities at or above this one, for query filters
    pub fn at_or_above(&self) -> &'static [Severity] {
        match self {
            Severity::Low => &[
                Severity::Low,
                Severity::Medium,
                Severity::High,
                Severity::Critical,
            ],
            Severity::Medium => &[Severity::Medium, Severity::High, Severity::Critical],
            Severity::High => &[Severity::High, Severity::Critical],
            Severity::Critical => &[Severity::Critical],
        }
    }
}

/// A blacklistable subject: an account, a device, or an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistSubject {
    User(Uuid),
    Device(String),
    Ip(String),
}

impl BlacklistSubject {
    pub fn kind_str(&self) -> &'static str {
        match self {
            BlacklistSubject::User(_) => "user",
            BlacklistSubject::Device(_) => "device",
            BlacklistSubject::Ip(_) => "ip",
        }
    }

    pub fn value_string(&self) -> String {
        match self {
            BlacklistSubject::User(id) => id.to_string(),
            BlacklistSubject::Device(v) => v.clone(),
            BlacklistSubject::Ip(v) => v.clone(),
        }
    }

    /// Parse from the (type, value) pair the admin API receives
    pub fn parse(kind: &str, value: &str) -> Option<Self> {
        match kind {
            "user" => value.parse::<Uuid>().ok().map(BlacklistSubject::User),
            "device" if !value.is_empty() => Some(BlacklistSubject::Device(value.to_string())),
            "ip" if !value.is_empty() => Some(BlacklistSubject::Ip(value.to_string())),
            _ => None,
        }
    }
}

/// Sliding window names for the claim rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Minute,
    Hour,
    Day,
}

impl RateWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateWindow::Minute => "minute",
            RateWindow::Hour => "hour",
            RateWindow::Day => "day",
        }
    }

    /// Severity of the risk event emitted when this window is exceeded
    pub fn severity(&self) -> Severity {
        match self {
            RateWindow::Minute | RateWindow::Hour => Severity::Medium,
            RateWindow::Day => Severity::Low,
        }
    }
}

impl fmt::Display for RateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of a risk evaluation
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub score: RiskScore,
    pub level: RiskLevel,
    pub factors: Vec<&'static str>,
    pub should_block: bool,
}

/// Why an admission was denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    AccountBanned,
    DeviceBanned,
    IpBanned,
    RateLimited(RateWindow),
    RiskTooHigh,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::AccountBanned => write!(f, "account banned"),
            DenialReason::DeviceBanned => write!(f, "device banned"),
            DenialReason::IpBanned => write!(f, "ip banned"),
            DenialReason::RateLimited(window) => {
                write!(f, "claim limit per {} exceeded", window)
            }
            DenialReason::RiskTooHigh => write!(f, "risk too high"),
        }
    }
}

/// The gatekeeper's decision: a typed allow/deny, never an error
#[derive(Debug, Clone)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub score: Option<RiskScore>,
}

impl AdmissionDecision {
    pub fn allow(score: RiskScore) -> Self {
        Self {
            allowed: true,
            reason: None,
            score: Some(score),
        }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            score: None,
        }
    }

    pub fn deny_scored(reason: DenialReason, score: RiskScore) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            score: Some(score),
        }
    }
}
