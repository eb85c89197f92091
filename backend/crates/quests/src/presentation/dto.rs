//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::action::QuestAction;
use crate::domain::value_object::proof::ProofPayload;

/// Request for POST /api/quests/claim
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub quest_id: Uuid,
}

/// Response for POST /api/quests/claim
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// "claimed" | "already_claimed" | "denied"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
}

/// Request for POST /api/quests/submit
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub quest_id: Uuid,
    #[serde(default)]
    pub proof: Option<ProofPayload>,
}

/// Response for POST /api/quests/submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// "rewarded" | "already_rewarded" | "pending_review" | "rejected"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resubmittable: Option<bool>,
}

/// An action, as exposed to clients and the review queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_id: Uuid,
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub status: String,
    pub risk_score_at_claim: u8,
    pub social_identity: Option<String>,
    pub verifier_message: Option<String>,
    pub review_reason: Option<String>,
    pub claimed_at_ms: i64,
    pub submitted_at_ms: Option<i64>,
    pub verified_at_ms: Option<i64>,
}

impl From<&QuestAction> for ActionResponse {
    fn from(action: &QuestAction) -> Self {
        Self {
            action_id: action.action_id.into_uuid(),
            user_id: action.user_id.into_uuid(),
            quest_id: action.quest_id.into_uuid(),
            status: action.status.as_str().to_string(),
            risk_score_at_claim: action.risk_score_at_claim,
            social_identity: action.social_identity.clone(),
            verifier_message: action.proof.verifier_message.clone(),
            review_reason: action.proof.review_reason.clone(),
            claimed_at_ms: action.claimed_at.timestamp_millis(),
            submitted_at_ms: action.submitted_at.map(|t| t.timestamp_millis()),
            verified_at_ms: action.verified_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Response for GET /api/quests/me
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: Uuid,
    pub points: i64,
    pub risk_score: u8,
    pub invited: bool,
}

/// Request for POST /api/quests/admin/actions/{id}/reject
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub reason: String,
}

/// Response for POST /api/quests/identity/code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingCodeResponse {
    pub code: String,
    pub expires_at_ms: i64,
}

/// Request for POST /api/quests/identity/confirm
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingConfirmRequest {
    pub external_id: String,
}

/// Query for GET /api/quests/admin/review-queue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueQuery {
    #[serde(default)]
    pub offset: Option<i64>,
}
