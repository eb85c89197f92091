//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{BlacklistEntry, DeviceFingerprint, RiskEvent};
use crate::domain::value_objects::{BlacklistSubject, RiskScore, Severity};
use crate::error::RiskResult;

/// Device fingerprint repository trait
#[trait_variant::make(FingerprintRepository: Send)]
pub trait LocalFingerprintRepository {
    /// Upsert a (visitor id, user) observation
    async fn upsert_fingerprint(&self, fingerprint: &DeviceFingerprint) -> RiskResult<()>;

    /// Count distinct visitor ids seen for a user
    async fn count_devices_for_user(&self, user_id: Uuid) -> RiskResult<i64>;

    /// Whether any of the user's devices is also used by another user
    async fn user_has_shared_device(&self, user_id: Uuid) -> RiskResult<bool>;
}

/// IP activity repository trait
#[trait_variant::make(IpActivityRepository: Send)]
pub trait LocalIpActivityRepository {
    /// Record a request from (ip, user), incrementing the counter
    async fn record_ip(&self, ip: &str, user_id: Uuid) -> RiskResult<()>;

    /// Whether any of the user's IPs is shared by more than `user_threshold` users
    async fn user_has_crowded_ip(&self, user_id: Uuid, user_threshold: i64) -> RiskResult<bool>;
}

/// Blacklist repository trait
#[trait_variant::make(BlacklistRepository: Send)]
pub trait LocalBlacklistRepository {
    /// Find a live (unexpired) entry for a subject
    async fn find_active(&self, subject: &BlacklistSubject) -> RiskResult<Option<BlacklistEntry>>;

    /// Upsert an entry keyed on (subject type, value)
    async fn upsert_entry(&self, entry: &BlacklistEntry) -> RiskResult<()>;

    /// Remove an entry; returns whether one existed
    async fn remove_entry(&self, subject: &BlacklistSubject) -> RiskResult<bool>;

    /// Delete expired entries (operational cleanup; lookups filter anyway)
    async fn cleanup_expired(&self) -> RiskResult<u64>;
}

/// Filter for the admin risk event query
#[derive(Debug, Clone, Default)]
pub struct RiskEventFilter {
    pub user_id: Option<Uuid>,
    pub min_severity: Option<Severity>,
    pub limit: Option<i64>,
}

/// Risk event repository trait (append-only)
#[trait_variant::make(RiskEventRepository: Send)]
pub trait LocalRiskEventRepository {
    /// Append an event to the audit trail
    async fn append_event(&self, event: &RiskEvent) -> RiskResult<()>;

    /// Count high/critical events for a user since `since`
    async fn count_flagged_since(&self, user_id: Uuid, since: DateTime<Utc>) -> RiskResult<i64>;

    /// Recent events, newest first
    async fn find_recent(&self, filter: &RiskEventFilter) -> RiskResult<Vec<RiskEvent>>;
}

/// Claim activity repository trait
///
/// Counts quest actions created by a user; the window reads are
/// approximate-consistent by design (the cap is a deterrent, not a
/// financial guarantee).
#[trait_variant::make(ClaimActivityRepository: Send)]
pub trait LocalClaimActivityRepository {
    async fn count_claims_since(&self, user_id: Uuid, since: DateTime<Utc>) -> RiskResult<i64>;
}

/// User risk persistence trait
#[trait_variant::make(UserRiskRepository: Send)]
pub trait LocalUserRiskRepository {
    /// Persist the recomputed score onto the user row (last writer wins)
    async fn persist_score(&self, user_id: Uuid, score: RiskScore) -> RiskResult<()>;

    /// Account creation time, None if the user does not exist
    async fn account_created_at(&self, user_id: Uuid) -> RiskResult<Option<DateTime<Utc>>>;
}
