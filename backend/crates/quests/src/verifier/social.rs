//! Social Engagement Verifiers
//!
//! Follow and retweet checks against the social graph provider. Both are
//! identity-bound: the check runs against the user's bound external
//! account, and the reward is exclusive per (quest, identity).

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::value_object::quest_type::QuestType;
use crate::verifier::{SocialGraphApi, VerificationRequest, Verdict, Verifier, VerifierError};

/// Verifies FOLLOW_ACCOUNT quests
pub struct FollowVerifier {
    api: Arc<dyn SocialGraphApi>,
}

impl FollowVerifier {
    pub fn new(api: Arc<dyn SocialGraphApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Verifier for FollowVerifier {
    fn quest_type(&self) -> QuestType {
        QuestType::FollowAccount
    }

    fn requires_social_identity(&self) -> bool {
        true
    }

    async fn verify(&self, req: VerificationRequest<'_>) -> Result<Verdict, VerifierError> {
        let target = req.quest.target.as_deref().ok_or_else(|| {
            VerifierError::Misconfigured("quest has no target account".to_string())
        })?;
        let external_id = req.external_id.ok_or_else(|| {
            VerifierError::Misconfigured("no external identity supplied".to_string())
        })?;

        let follows = self.api.follows(external_id, target).await?;

        if follows {
            Ok(Verdict::Approved {
                message: Some("follow confirmed".to_string()),
            })
        } else {
            Ok(Verdict::Rejected {
                message: "not following the target account".to_string(),
            })
        }
    }
}

/// Verifies RETWEET quests
pub struct RetweetVerifier {
    api: Arc<dyn SocialGraphApi>,
}

impl RetweetVerifier {
    pub fn new(api: Arc<dyn SocialGraphApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Verifier for RetweetVerifier {
    fn quest_type(&self) -> QuestType {
        QuestType::Retweet
    }

    fn requires_social_identity(&self) -> bool {
        true
    }

    async fn verify(&self, req: VerificationRequest<'_>) -> Result<Verdict, VerifierError> {
        let post_url = req.quest.target.as_deref().ok_or_else(|| {
            VerifierError::Misconfigured("quest has no target post".to_string())
        })?;
        let external_id = req.external_id.ok_or_else(|| {
            VerifierError::Misconfigured("no external identity supplied".to_string())
        })?;

        let retweeted = self.api.has_retweeted(external_id, post_url).await?;

        if retweeted {
            Ok(Verdict::Approved {
                message: Some("retweet confirmed".to_string()),
            })
        } else {
            Ok(Verdict::Rejected {
                message: "retweet not found".to_string(),
            })
        }
    }
}
