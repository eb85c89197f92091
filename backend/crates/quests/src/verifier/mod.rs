//! Verifiers
//!
//! One verifier per quest type, selected through [`registry::VerifierRegistry`].
//! Verifiers talk to remote providers through the narrow seams below;
//! provider transport failures stay distinct from rejections so the state
//! machine can leave the action untouched and tell the client to retry.

pub mod membership;
pub mod registry;
pub mod screenshot;
pub mod social;

use async_trait::async_trait;
use kernel::id::UserId;
use thiserror::Error;

use crate::domain::entity::quest::Quest;
use crate::domain::value_object::proof::ProofPayload;
use crate::domain::value_object::quest_type::QuestType;

/// What a verifier decides about a submission
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Proof checks out; the ledger grants synchronously
    Approved { message: Option<String> },
    /// Deterministic failure ("not a member", "not following")
    Rejected { message: String },
    /// Cannot decide synchronously; queue for admin review
    NeedsReview { message: Option<String> },
}

/// Verifier faults, kept apart from verdicts
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Provider timeout/5xx; the action must stay in its pre-call state
    #[error("provider unavailable: {0}")]
    Transient(String),

    /// The quest or verifier is missing required parameters
    #[error("verifier misconfigured: {0}")]
    Misconfigured(String),
}

/// Everything a verifier may look at
#[derive(Debug)]
pub struct VerificationRequest<'a> {
    pub user_id: UserId,
    pub quest: &'a Quest,
    pub payload: Option<&'a ProofPayload>,
    /// Bound external identity, present for identity-bound quest types
    pub external_id: Option<&'a str>,
}

/// Pluggable verification per quest type
#[async_trait]
pub trait Verifier: Send + Sync {
    fn quest_type(&self) -> QuestType;

    /// Whether this verifier needs a bound social identity
    fn requires_social_identity(&self) -> bool {
        false
    }

    /// One-shot types reject terminally; others leave the action
    /// resubmittable after a deterministic failure
    fn one_shot(&self) -> bool {
        false
    }

    async fn verify(&self, req: VerificationRequest<'_>) -> Result<Verdict, VerifierError>;
}

// ============================================================================
// Provider seams (implementations are external collaborators)
// ============================================================================

/// Transport-level provider failures
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Timeout, 5xx, connection refused; retryable
    #[error("{0}")]
    Unavailable(String),

    /// The provider rejected the request shape itself
    #[error("{0}")]
    Invalid(String),
}

impl From<ProviderError> for VerifierError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(msg) => VerifierError::Transient(msg),
            ProviderError::Invalid(msg) => VerifierError::Misconfigured(msg),
        }
    }
}

/// Chat membership lookups (e.g. a Telegram-backed service)
#[async_trait]
pub trait ChatMembershipApi: Send + Sync {
    async fn is_member(&self, channel_id: &str, user_id: UserId) -> Result<bool, ProviderError>;
}

/// Social graph lookups (e.g. a Twitter-backed service)
#[async_trait]
pub trait SocialGraphApi: Send + Sync {
    async fn follows(&self, external_id: &str, target_handle: &str) -> Result<bool, ProviderError>;

    async fn has_retweeted(&self, external_id: &str, post_url: &str)
    -> Result<bool, ProviderError>;

    /// Profile text, searched for the binding verification code
    async fn profile_bio(&self, external_id: &str) -> Result<String, ProviderError>;
}

/// AI screenshot classification result
#[derive(Debug, Clone)]
pub struct Classification {
    pub approved: bool,
    pub confidence: f32,
    pub needs_manual_review: bool,
    pub summary: Option<String>,
}

/// AI screenshot classification collaborator
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(
        &self,
        image_b64: &str,
        quest_title: &str,
    ) -> Result<Classification, ProviderError>;
}
