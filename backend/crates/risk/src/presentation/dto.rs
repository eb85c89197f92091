//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for POST /api/risk/fingerprint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFingerprintRequest {
    pub visitor_id: String,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Request for POST /api/risk/blacklist
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistUpsertRequest {
    pub subject_type: String,
    pub value: String,
    pub reason: String,
    #[serde(default)]
    pub expires_at_ms: Option<i64>,
}

/// Request for DELETE /api/risk/blacklist
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistRemoveRequest {
    pub subject_type: String,
    pub value: String,
}

/// Request for POST /api/risk/score-override
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOverrideRequest {
    pub user_id: Uuid,
    pub score: u8,
    #[serde(default)]
    pub note: Option<String>,
}

/// Query for GET /api/risk/events
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEventQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub min_severity: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A risk event, as exposed to the admin dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEventResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub severity: String,
    pub details: serde_json::Value,
    pub ip: Option<String>,
    pub visitor_id: Option<String>,
    pub created_at_ms: i64,
}

/// Response for GET /api/risk/users/{id}/assessment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub score: u8,
    pub level: String,
    pub factors: Vec<String>,
    pub should_block: bool,
}
