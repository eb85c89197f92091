//! Channel Membership Verifier

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::value_object::quest_type::QuestType;
use crate::verifier::{
    ChatMembershipApi, VerificationRequest, Verdict, Verifier, VerifierError,
};

/// Verifies JOIN_CHANNEL quests by asking the chat provider whether the
/// user is a member of the quest's channel.
pub struct ChannelMembershipVerifier {
    api: Arc<dyn ChatMembershipApi>,
}

impl ChannelMembershipVerifier {
    pub fn new(api: Arc<dyn ChatMembershipApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Verifier for ChannelMembershipVerifier {
    fn quest_type(&self) -> QuestType {
        QuestType::JoinChannel
    }

    async fn verify(&self, req: VerificationRequest<'_>) -> Result<Verdict, VerifierError> {
        let channel_id = req.quest.channel_id.as_deref().ok_or_else(|| {
            VerifierError::Misconfigured("quest has no channel id".to_string())
        })?;

        let is_member = self.api.is_member(channel_id, req.user_id).await?;

        if is_member {
            Ok(Verdict::Approved {
                message: Some("channel membership confirmed".to_string()),
            })
        } else {
            Ok(Verdict::Rejected {
                message: "channel membership not found".to_string(),
            })
        }
    }
}
