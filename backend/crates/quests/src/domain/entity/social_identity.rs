//! Social Identity Binding
//!
//! Links a local account to an external social account. The binding is
//! proven by a short-lived verification code the user places on the
//! external profile; the code lives in storage with a TTL so correctness
//! survives restarts and horizontal scaling.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

/// A confirmed binding between a user and an external account
#[derive(Debug, Clone)]
pub struct SocialIdentityBinding {
    pub user_id: UserId,
    pub provider: String,
    pub external_id: String,
    pub bound_at: DateTime<Utc>,
}

impl SocialIdentityBinding {
    pub fn new(user_id: UserId, provider: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            user_id,
            provider: provider.into(),
            external_id: external_id.into(),
            bound_at: Utc::now(),
        }
    }
}

/// A pending verification code, one per user, consumed atomically
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub user_id: UserId,
    pub code: String,
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn new(user_id: UserId, code: String, ttl_ms: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            code,
            expires_at_ms: now.timestamp_millis() + ttl_ms,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }
}
