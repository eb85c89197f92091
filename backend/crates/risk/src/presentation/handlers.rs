//! HTTP Handlers
//!
//! User identity arrives in the `X-User-Id` header, injected by the
//! upstream gateway after authentication (authentication itself is not
//! this service's concern).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use platform::client::extract_client_identity;
use uuid::Uuid;

use crate::application::config::{ClaimRateConfig, RiskConfig};
use crate::application::evaluate_risk::EvaluateRiskUseCase;
use crate::application::manage_blacklist::ManageBlacklistUseCase;
use crate::application::track_client::{TrackClientInput, TrackClientUseCase};
use crate::domain::repository::{
    BlacklistRepository, ClaimActivityRepository, FingerprintRepository, IpActivityRepository,
    RiskEventFilter, RiskEventRepository, UserRiskRepository,
};
use crate::domain::value_objects::{BlacklistSubject, RiskScore, Severity};
use crate::error::{RiskError, RiskResult};
use crate::presentation::dto::{
    AssessmentResponse, BlacklistRemoveRequest, BlacklistUpsertRequest, ReportFingerprintRequest,
    RiskEventQuery, RiskEventResponse, ScoreOverrideRequest,
};

const USER_ID_HEADER: &str = "x-user-id";

/// Shared state for risk handlers
#[derive(Clone)]
pub struct RiskAppState<R>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub repo: Arc<R>,
    pub risk_config: Arc<RiskConfig>,
    pub rate_config: Arc<ClaimRateConfig>,
}

/// Read the authenticated user id injected by the gateway
pub fn require_user_id(headers: &HeaderMap) -> RiskResult<Uuid> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uuid>().ok())
        .ok_or_else(|| RiskError::MissingHeader(USER_ID_HEADER.to_string()))
}

/// POST /api/risk/fingerprint
pub async fn report_fingerprint<R>(
    State(state): State<RiskAppState<R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<ReportFingerprintRequest>,
) -> RiskResult<impl IntoResponse>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let user_id = require_user_id(&headers)?;
    let identity = extract_client_identity(&headers, Some(addr.ip()));

    // Fold the server-side user agent hash into the stored attributes so
    // the fraud graph is not purely client-asserted
    let mut attributes = req.attributes.unwrap_or_else(|| serde_json::json!({}));
    if let (Some(obj), Some(hash)) = (attributes.as_object_mut(), identity.user_agent_hash) {
        let hex: String = hash.iter().map(|b| format!("{:02x}", b)).collect();
        obj.insert("uaSha256".to_string(), serde_json::Value::String(hex));
    }

    let use_case = TrackClientUseCase::new(state.repo.clone());
    use_case
        .execute(TrackClientInput {
            user_id,
            visitor_id: Some(req.visitor_id),
            attributes,
            ip: identity.ip.map(|ip| ip.to_string()),
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/risk/users/{user_id}/assessment (admin)
pub async fn user_assessment<R>(
    State(state): State<RiskAppState<R>>,
    axum::extract::Path(user_id): axum::extract::Path<Uuid>,
) -> RiskResult<Json<AssessmentResponse>>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = EvaluateRiskUseCase::new(state.repo.clone(), state.risk_config.clone());
    let assessment = use_case.execute(user_id).await?;

    Ok(Json(AssessmentResponse {
        score: assessment.score.value(),
        level: assessment.level.as_str().to_string(),
        factors: assessment.factors.iter().map(|f| f.to_string()).collect(),
        should_block: assessment.should_block,
    }))
}

/// POST /api/risk/blacklist (admin)
pub async fn blacklist_add<R>(
    State(state): State<RiskAppState<R>>,
    Json(req): Json<BlacklistUpsertRequest>,
) -> RiskResult<impl IntoResponse>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let subject = parse_subject(&req.subject_type, &req.value)?;
    let expires_at = req.expires_at_ms.and_then(DateTime::<Utc>::from_timestamp_millis);

    let use_case = ManageBlacklistUseCase::new(state.repo.clone());
    use_case.add(subject, req.reason, expires_at).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/risk/blacklist (admin)
pub async fn blacklist_remove<R>(
    State(state): State<RiskAppState<R>>,
    Json(req): Json<BlacklistRemoveRequest>,
) -> RiskResult<impl IntoResponse>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let subject = parse_subject(&req.subject_type, &req.value)?;

    let use_case = ManageBlacklistUseCase::new(state.repo.clone());
    use_case.remove(subject).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/risk/score-override (admin)
pub async fn score_override<R>(
    State(state): State<RiskAppState<R>>,
    Json(req): Json<ScoreOverrideRequest>,
) -> RiskResult<impl IntoResponse>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let use_case = ManageBlacklistUseCase::new(state.repo.clone());
    use_case
        .override_score(req.user_id, RiskScore::from_raw(req.score as u32), req.note)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/risk/events (admin)
pub async fn list_events<R>(
    State(state): State<RiskAppState<R>>,
    Query(query): Query<RiskEventQuery>,
) -> RiskResult<Json<Vec<RiskEventResponse>>>
where
    R: FingerprintRepository
        + IpActivityRepository
        + BlacklistRepository
        + RiskEventRepository
        + ClaimActivityRepository
        + UserRiskRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let min_severity = match query.min_severity.as_deref() {
        Some(s) => Some(
            Severity::from_str(s)
                .ok_or_else(|| RiskError::InvalidSubject(format!("unknown severity: {}", s)))?,
        ),
        None => None,
    };

    let filter = RiskEventFilter {
        user_id: query.user_id,
        min_severity,
        limit: query.limit,
    };

    let events = state.repo.find_recent(&filter).await?;

    Ok(Json(
        events
            .into_iter()
            .map(|e| RiskEventResponse {
                id: e.id,
                user_id: e.user_id,
                event_type: e.event_type,
                severity: e.severity.as_str().to_string(),
                details: e.details,
                ip: e.ip,
                visitor_id: e.visitor_id,
                created_at_ms: e.created_at.timestamp_millis(),
            })
            .collect(),
    ))
}

fn parse_subject(kind: &str, value: &str) -> RiskResult<BlacklistSubject> {
    BlacklistSubject::parse(kind, value)
        .ok_or_else(|| RiskError::InvalidSubject(format!("{} {}", kind, value)))
}
