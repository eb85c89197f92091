//! Quest Type
//!
//! The closed set of quest types this pipeline can verify. Each type has
//! exactly one verifier implementation, selected through the registry.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    /// Join a chat channel; membership is checked remotely
    #[display("join_channel")]
    JoinChannel,
    /// Follow an account on the social network
    #[display("follow_account")]
    FollowAccount,
    /// Retweet a post
    #[display("retweet")]
    Retweet,
    /// Submit a screenshot as proof; classified by the AI collaborator
    #[display("screenshot_proof")]
    ScreenshotProof,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::JoinChannel => "join_channel",
            QuestType::FollowAccount => "follow_account",
            QuestType::Retweet => "retweet",
            QuestType::ScreenshotProof => "screenshot_proof",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "join_channel" => Some(QuestType::JoinChannel),
            "follow_account" => Some(QuestType::FollowAccount),
            "retweet" => Some(QuestType::Retweet),
            "screenshot_proof" => Some(QuestType::ScreenshotProof),
            _ => None,
        }
    }

    /// Whether correctness is bound to an external social identity.
    ///
    /// For these types, at most one rewarded action per (quest, identity)
    /// exists worldwide, regardless of which local account submits.
    pub fn is_identity_bound(&self) -> bool {
        matches!(self, QuestType::FollowAccount | QuestType::Retweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for quest_type in [
            QuestType::JoinChannel,
            QuestType::FollowAccount,
            QuestType::Retweet,
            QuestType::ScreenshotProof,
        ] {
            assert_eq!(QuestType::from_str(quest_type.as_str()), Some(quest_type));
        }
        assert_eq!(QuestType::from_str("bogus"), None);
    }

    #[test]
    fn test_identity_bound_types() {
        assert!(!QuestType::JoinChannel.is_identity_bound());
        assert!(QuestType::FollowAccount.is_identity_bound());
        assert!(QuestType::Retweet.is_identity_bound());
        assert!(!QuestType::ScreenshotProof.is_identity_bound());
    }
}
