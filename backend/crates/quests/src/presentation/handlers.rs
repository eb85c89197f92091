//! HTTP Handlers
//!
//! User identity arrives in the `X-User-Id` header, injected by the
//! upstream gateway after authentication. Admin routes are expected to be
//! mounted behind the gateway's admin authorization.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use kernel::id::{QuestId, UserId};
use platform::client::extract_client_identity;
use uuid::Uuid;

use crate::application::bind_identity::BindIdentityUseCase;
use crate::application::claim_quest::{
    AdmissionGate, ClaimOutcome, ClaimQuestInput, ClaimQuestUseCase,
};
use crate::application::config::QuestConfig;
use crate::application::review_action::{ReviewActionUseCase, ReviewOutcome};
use crate::application::submit_proof::{SubmitOutcome, SubmitProofInput, SubmitProofUseCase};
use crate::domain::repository::{
    ActionRepository, LedgerRepository, QuestRepository, SocialIdentityRepository, UserRepository,
};
use crate::error::{QuestError, QuestResult};
use crate::notify::Notifier;
use crate::presentation::dto::{
    ActionResponse, BindingCodeResponse, BindingConfirmRequest, ClaimRequest, ClaimResponse,
    MeResponse, RejectRequest, ReviewQueueQuery, SubmitRequest, SubmitResponse,
};
use crate::verifier::SocialGraphApi;
use crate::verifier::registry::VerifierRegistry;

const USER_ID_HEADER: &str = "x-user-id";

/// Everything the handlers need from storage, as one bound
pub trait QuestStore:
    QuestRepository
    + ActionRepository
    + LedgerRepository
    + SocialIdentityRepository
    + UserRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> QuestStore for T where
    T: QuestRepository
        + ActionRepository
        + LedgerRepository
        + SocialIdentityRepository
        + UserRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for quest handlers
pub struct QuestAppState<R, G>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub gate: Arc<G>,
    pub registry: Arc<VerifierRegistry>,
    pub social: Arc<dyn SocialGraphApi>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<QuestConfig>,
}

impl<R, G> Clone for QuestAppState<R, G>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            gate: self.gate.clone(),
            registry: self.registry.clone(),
            social: self.social.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

/// Read the authenticated user id injected by the gateway
fn require_user_id(headers: &HeaderMap) -> QuestResult<Uuid> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uuid>().ok())
        .ok_or_else(|| QuestError::MissingHeader(USER_ID_HEADER.to_string()))
}

/// POST /api/quests/claim
pub async fn claim<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<ClaimRequest>,
) -> QuestResult<Json<ClaimResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;
    let identity = extract_client_identity(&headers, Some(addr.ip()));

    let use_case = ClaimQuestUseCase::new(state.repo.clone(), state.gate.clone());

    let outcome = use_case
        .execute(ClaimQuestInput {
            user_id,
            quest_id: req.quest_id,
            ip: identity.ip.map(|ip| ip.to_string()),
            visitor_id: identity.visitor_id,
        })
        .await?;

    let response = match outcome {
        ClaimOutcome::Claimed(action) => ClaimResponse {
            status: "claimed".to_string(),
            action_id: Some(action.action_id.into_uuid()),
            action_status: Some(action.status.as_str().to_string()),
            reason: None,
            risk_score: Some(action.risk_score_at_claim),
        },
        ClaimOutcome::AlreadyClaimed(action) => ClaimResponse {
            status: "already_claimed".to_string(),
            action_id: Some(action.action_id.into_uuid()),
            action_status: Some(action.status.as_str().to_string()),
            reason: None,
            risk_score: Some(action.risk_score_at_claim),
        },
        ClaimOutcome::Denied { reason, score } => ClaimResponse {
            status: "denied".to_string(),
            action_id: None,
            action_status: None,
            reason: Some(reason),
            risk_score: score,
        },
    };

    Ok(Json(response))
}

/// POST /api/quests/submit
pub async fn submit<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
    Json(req): Json<SubmitRequest>,
) -> QuestResult<Json<SubmitResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;

    let use_case = SubmitProofUseCase::new(
        state.repo.clone(),
        state.registry.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let outcome = use_case
        .execute(SubmitProofInput {
            user_id,
            quest_id: req.quest_id,
            payload: req.proof,
        })
        .await?;

    let response = match outcome {
        SubmitOutcome::Rewarded { amount, points } => SubmitResponse {
            status: "rewarded".to_string(),
            message: None,
            reward_amount: Some(amount),
            points: Some(points),
            resubmittable: None,
        },
        SubmitOutcome::AlreadyRewarded => SubmitResponse {
            status: "already_rewarded".to_string(),
            message: None,
            reward_amount: None,
            points: None,
            resubmittable: None,
        },
        SubmitOutcome::PendingReview => SubmitResponse {
            status: "pending_review".to_string(),
            message: None,
            reward_amount: None,
            points: None,
            resubmittable: None,
        },
        SubmitOutcome::Rejected {
            message,
            resubmittable,
        } => SubmitResponse {
            status: "rejected".to_string(),
            message: Some(message),
            reward_amount: None,
            points: None,
            resubmittable: Some(resubmittable),
        },
    };

    Ok(Json(response))
}

/// GET /api/quests/me
pub async fn get_me<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
) -> QuestResult<Json<MeResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;

    let user = state
        .repo
        .find_user(UserId::from_uuid(user_id))
        .await?
        .ok_or(QuestError::UserNotFound)?;

    Ok(Json(MeResponse {
        user_id: user.user_id.into_uuid(),
        points: user.points,
        risk_score: user.risk_score,
        invited: user.invited_by.is_some(),
    }))
}

/// GET /api/quests/{quest_id}/action
pub async fn get_my_action<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
    Path(quest_id): Path<Uuid>,
) -> QuestResult<Json<ActionResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;

    let action = state
        .repo
        .find_by_user_and_quest(UserId::from_uuid(user_id), QuestId::from_uuid(quest_id))
        .await?
        .ok_or(QuestError::ActionNotFound)?;

    Ok(Json(ActionResponse::from(&action)))
}

/// POST /api/quests/identity/code
pub async fn issue_binding_code<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
) -> QuestResult<Json<BindingCodeResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;

    let use_case =
        BindIdentityUseCase::new(state.repo.clone(), state.social.clone(), state.config.clone());
    let output = use_case.issue_code(user_id).await?;

    Ok(Json(BindingCodeResponse {
        code: output.code,
        expires_at_ms: output.expires_at_ms,
    }))
}

/// POST /api/quests/identity/confirm
pub async fn confirm_binding<R, G>(
    State(state): State<QuestAppState<R, G>>,
    headers: HeaderMap,
    Json(req): Json<BindingConfirmRequest>,
) -> QuestResult<impl IntoResponse>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let user_id = require_user_id(&headers)?;

    let use_case =
        BindIdentityUseCase::new(state.repo.clone(), state.social.clone(), state.config.clone());
    use_case.confirm(user_id, req.external_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/quests/admin/review-queue
pub async fn review_queue<R, G>(
    State(state): State<QuestAppState<R, G>>,
    Query(query): Query<ReviewQueueQuery>,
) -> QuestResult<Json<Vec<ActionResponse>>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let use_case =
        ReviewActionUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());
    let actions = use_case.list_queue(query.offset.unwrap_or(0)).await?;

    Ok(Json(actions.iter().map(ActionResponse::from).collect()))
}

/// POST /api/quests/admin/actions/{action_id}/approve
pub async fn approve_action<R, G>(
    State(state): State<QuestAppState<R, G>>,
    Path(action_id): Path<Uuid>,
) -> QuestResult<Json<SubmitResponse>>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let use_case =
        ReviewActionUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());

    let response = match use_case.approve(action_id).await? {
        ReviewOutcome::Rewarded { amount, points } => SubmitResponse {
            status: "rewarded".to_string(),
            message: None,
            reward_amount: Some(amount),
            points: Some(points),
            resubmittable: None,
        },
        ReviewOutcome::AlreadyRewarded => SubmitResponse {
            status: "already_rewarded".to_string(),
            message: None,
            reward_amount: None,
            points: None,
            resubmittable: None,
        },
    };

    Ok(Json(response))
}

/// POST /api/quests/admin/actions/{action_id}/reject
pub async fn reject_action<R, G>(
    State(state): State<QuestAppState<R, G>>,
    Path(action_id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> QuestResult<impl IntoResponse>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let use_case =
        ReviewActionUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());
    use_case.reject(action_id, req.reason).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/quests/admin/actions/{action_id}/reopen
pub async fn reopen_action<R, G>(
    State(state): State<QuestAppState<R, G>>,
    Path(action_id): Path<Uuid>,
) -> QuestResult<impl IntoResponse>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let use_case =
        ReviewActionUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());
    use_case.reopen(action_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/quests/admin/actions/{action_id}
pub async fn delete_action<R, G>(
    State(state): State<QuestAppState<R, G>>,
    Path(action_id): Path<Uuid>,
) -> QuestResult<impl IntoResponse>
where
    R: QuestStore,
    G: AdmissionGate + Send + Sync + 'static,
{
    let use_case =
        ReviewActionUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());
    use_case.hard_delete(action_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
