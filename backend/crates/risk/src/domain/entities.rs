//! Domain Entities
//!
//! Core business entities for the risk domain.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::{BlacklistSubject, Severity};

/// A (visitor id, user) observation from the client fingerprinting script.
///
/// Many users on one visitor id is a device-farm signal; many visitor ids
/// on one user is a multi-device signal. Both are read from this table.
#[derive(Debug, Clone)]
pub struct DeviceFingerprint {
    pub visitor_id: String,
    pub user_id: Uuid,
    pub attributes: serde_json::Value,
    pub last_seen_at: DateTime<Utc>,
}

impl DeviceFingerprint {
    pub fn new(visitor_id: String, user_id: Uuid, attributes: serde_json::Value) -> Self {
        Self {
            visitor_id,
            user_id,
            attributes,
            last_seen_at: Utc::now(),
        }
    }
}

/// An (ip, user) observation with a request counter
#[derive(Debug, Clone)]
pub struct IpRecord {
    pub ip: String,
    pub user_id: Uuid,
    pub request_count: i64,
    pub last_seen_at: DateTime<Utc>,
}

/// Blacklist entry keyed by (subject type, value).
///
/// An entry past its expiry is inert but not deleted; lookups must filter.
#[derive(Debug, Clone)]
pub struct BlacklistEntry {
    pub subject: BlacklistSubject,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(subject: BlacklistSubject, reason: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            subject,
            reason,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

/// Append-only audit record; never mutated or deleted
#[derive(Debug, Clone)]
pub struct RiskEvent {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub severity: Severity,
    pub details: serde_json::Value,
    pub ip: Option<String>,
    pub visitor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RiskEvent {
    pub fn new(event_type: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            event_type: event_type.into(),
            severity,
            details: serde_json::Value::Null,
            ip: None,
            visitor_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_client(mut self, ip: Option<String>, visitor_id: Option<String>) -> Self {
        self.ip = ip;
        self.visitor_id = visitor_id;
        self
    }
}

/// Event type tags written by this crate
pub mod event_types {
    pub const RATE_LIMIT_EXCEEDED: &str = "rate_limit_exceeded";
    pub const RISK_BLOCK: &str = "risk_block";
    pub const BLACKLIST_ADDED: &str = "blacklist_added";
    pub const BLACKLIST_REMOVED: &str = "blacklist_removed";
    pub const SCORE_OVERRIDDEN: &str = "score_overridden";
}
