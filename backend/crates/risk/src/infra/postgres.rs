//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{BlacklistEntry, DeviceFingerprint, RiskEvent};
use crate::domain::repository::{
    BlacklistRepository, ClaimActivityRepository, FingerprintRepository, IpActivityRepository,
    RiskEventFilter, RiskEventRepository, UserRiskRepository,
};
use crate::domain::value_objects::{BlacklistSubject, RiskScore, Severity};
use crate::error::{RiskError, RiskResult};

const DEFAULT_EVENT_LIMIT: i64 = 100;

/// PostgreSQL-backed risk repository
#[derive(Clone)]
pub struct PgRiskRepository {
    pool: PgPool,
}

impl PgRiskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired blacklist entries. Lookups filter on expiry anyway;
    /// this keeps the table small.
    pub async fn cleanup_expired(&self) -> RiskResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM blacklist_entries WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(entries_deleted = deleted, "Cleaned up expired blacklist entries");

        Ok(deleted)
    }
}

impl FingerprintRepository for PgRiskRepository {
    async fn upsert_fingerprint(&self, fingerprint: &DeviceFingerprint) -> RiskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_fingerprints (visitor_id, user_id, attributes, last_seen_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (visitor_id, user_id)
            DO UPDATE SET attributes = $3, last_seen_at = $4
            "#,
        )
        .bind(&fingerprint.visitor_id)
        .bind(fingerprint.user_id)
        .bind(&fingerprint.attributes)
        .bind(fingerprint.last_seen_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_devices_for_user(&self, user_id: Uuid) -> RiskResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT visitor_id) FROM device_fingerprints WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn user_has_shared_device(&self, user_id: Uuid) -> RiskResult<bool> {
        // First match wins; EXISTS stops at one row
        let shared = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM device_fingerprints mine
                WHERE mine.user_id = $1
                  AND EXISTS(
                      SELECT 1 FROM device_fingerprints other
                      WHERE other.visitor_id = mine.visitor_id
                        AND other.user_id != $1
                  )
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(shared)
    }
}

impl IpActivityRepository for PgRiskRepository {
    async fn record_ip(&self, ip: &str, user_id: Uuid) -> RiskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ip_records (ip, user_id, request_count, last_seen_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (ip, user_id)
            DO UPDATE SET request_count = ip_records.request_count + 1, last_seen_at = $3
            "#,
        )
        .bind(ip)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn user_has_crowded_ip(&self, user_id: Uuid, user_threshold: i64) -> RiskResult<bool> {
        let crowded = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM ip_records mine
                WHERE mine.user_id = $1
                  AND (
                      SELECT COUNT(DISTINCT other.user_id)
                      FROM ip_records other
                      WHERE other.ip = mine.ip
                  ) > $2
            )
            "#,
        )
        .bind(user_id)
        .bind(user_threshold)
        .fetch_one(&self.pool)
        .await?;

        Ok(crowded)
    }
}

impl BlacklistRepository for PgRiskRepository {
    async fn find_active(&self, subject: &BlacklistSubject) -> RiskResult<Option<BlacklistEntry>> {
        let row = sqlx::query_as::<_, BlacklistRow>(
            r#"
            SELECT subject_type, subject_value, reason, expires_at, created_at
            FROM blacklist_entries
            WHERE subject_type = $1
              AND subject_value = $2
              AND (expires_at IS NULL OR expires_at > $3)
            "#,
        )
        .bind(subject.kind_str())
        .bind(subject.value_string())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_entry()).transpose()
    }

    async fn upsert_entry(&self, entry: &BlacklistEntry) -> RiskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blacklist_entries (subject_type, subject_value, reason, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (subject_type, subject_value)
            DO UPDATE SET reason = $3, expires_at = $4
            "#,
        )
        .bind(entry.subject.kind_str())
        .bind(entry.subject.value_string())
        .bind(&entry.reason)
        .bind(entry.expires_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_entry(&self, subject: &BlacklistSubject) -> RiskResult<bool> {
        let affected = sqlx::query(
            "DELETE FROM blacklist_entries WHERE subject_type = $1 AND subject_value = $2",
        )
        .bind(subject.kind_str())
        .bind(subject.value_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn cleanup_expired(&self) -> RiskResult<u64> {
        self.cleanup_expired().await
    }
}

impl RiskEventRepository for PgRiskRepository {
    async fn append_event(&self, event: &RiskEvent) -> RiskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO risk_events (
                risk_event_id,
                user_id,
                event_type,
                severity,
                details,
                ip,
                visitor_id,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.event_type)
        .bind(event.severity.as_str())
        .bind(&event.details)
        .bind(&event.ip)
        .bind(&event.visitor_id)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_flagged_since(&self, user_id: Uuid, since: DateTime<Utc>) -> RiskResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM risk_events
            WHERE user_id = $1
              AND severity IN ('high', 'critical')
              AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn find_recent(&self, filter: &RiskEventFilter) -> RiskResult<Vec<RiskEvent>> {
        let severities: Vec<String> = filter
            .min_severity
            .unwrap_or(Severity::Low)
            .at_or_above()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, RiskEventRow>(
            r#"
            SELECT
                risk_event_id,
                user_id,
                event_type,
                severity,
                details,
                ip,
                visitor_id,
                created_at
            FROM risk_events
            WHERE severity = ANY($1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(&severities)
        .bind(filter.user_id)
        .bind(filter.limit.unwrap_or(DEFAULT_EVENT_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_event()).collect()
    }
}

impl ClaimActivityRepository for PgRiskRepository {
    async fn count_claims_since(&self, user_id: Uuid, since: DateTime<Utc>) -> RiskResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quest_actions WHERE user_id = $1 AND claimed_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

impl UserRiskRepository for PgRiskRepository {
    async fn persist_score(&self, user_id: Uuid, score: RiskScore) -> RiskResult<()> {
        sqlx::query("UPDATE users SET risk_score = $2, updated_at = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(score.value() as i16)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn account_created_at(&self, user_id: Uuid) -> RiskResult<Option<DateTime<Utc>>> {
        let created_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created_at)
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct BlacklistRow {
    subject_type: String,
    subject_value: String,
    reason: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl BlacklistRow {
    fn into_entry(self) -> RiskResult<BlacklistEntry> {
        let subject = BlacklistSubject::parse(&self.subject_type, &self.subject_value)
            .ok_or_else(|| {
                RiskError::Internal(format!("Invalid blacklist subject: {}", self.subject_type))
            })?;

        Ok(BlacklistEntry {
            subject,
            reason: self.reason,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RiskEventRow {
    risk_event_id: Uuid,
    user_id: Option<Uuid>,
    event_type: String,
    severity: String,
    details: serde_json::Value,
    ip: Option<String>,
    visitor_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl RiskEventRow {
    fn into_event(self) -> RiskResult<RiskEvent> {
        let severity = Severity::from_str(&self.severity)
            .ok_or_else(|| RiskError::Internal(format!("Invalid severity: {}", self.severity)))?;

        Ok(RiskEvent {
            id: self.risk_event_id,
            user_id: self.user_id,
            event_type: self.event_type,
            severity,
            details: self.details,
            ip: self.ip,
            visitor_id: self.visitor_id,
            created_at: self.created_at,
        })
    }
}
