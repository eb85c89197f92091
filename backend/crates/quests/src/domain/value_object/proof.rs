//! Proof Payloads
//!
//! Tagged proof variants per quest type, a closed set the state machine
//! can validate structurally instead of trusting caller-supplied JSON.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::quest_type::QuestType;

/// What a user attaches to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofPayload {
    /// Membership quests carry no client proof; the server checks remotely
    ChannelMembership,
    /// Engagement quests optionally carry the post the user interacted with
    SocialEngagement {
        #[serde(default)]
        post_url: Option<String>,
    },
    /// Screenshot quests carry the image, base64-encoded
    Screenshot {
        image_b64: String,
        #[serde(default)]
        note: Option<String>,
    },
}

impl ProofPayload {
    /// Whether this payload shape is legal for the quest type
    pub fn matches(&self, quest_type: QuestType) -> bool {
        matches!(
            (self, quest_type),
            (ProofPayload::ChannelMembership, QuestType::JoinChannel)
                | (
                    ProofPayload::SocialEngagement { .. },
                    QuestType::FollowAccount | QuestType::Retweet
                )
                | (ProofPayload::Screenshot { .. }, QuestType::ScreenshotProof)
        )
    }
}

/// The full proof blob stored on an action: the submitted payload plus
/// the verifier's message and any admin review reason, kept for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    #[serde(default)]
    pub payload: Option<ProofPayload>,
    #[serde(default)]
    pub verifier_message: Option<String>,
    #[serde(default)]
    pub review_reason: Option<String>,
}

impl ProofRecord {
    pub fn is_empty(&self) -> bool {
        self.payload.is_none() && self.verifier_message.is_none() && self.review_reason.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_matching() {
        assert!(ProofPayload::ChannelMembership.matches(QuestType::JoinChannel));
        assert!(!ProofPayload::ChannelMembership.matches(QuestType::Retweet));

        let engagement = ProofPayload::SocialEngagement { post_url: None };
        assert!(engagement.matches(QuestType::FollowAccount));
        assert!(engagement.matches(QuestType::Retweet));
        assert!(!engagement.matches(QuestType::ScreenshotProof));

        let screenshot = ProofPayload::Screenshot {
            image_b64: "aGVsbG8=".to_string(),
            note: None,
        };
        assert!(screenshot.matches(QuestType::ScreenshotProof));
        assert!(!screenshot.matches(QuestType::JoinChannel));
    }

    #[test]
    fn test_payload_tagged_serde() {
        let json = r#"{"kind":"screenshot","image_b64":"aGVsbG8=","note":"task done"}"#;
        let payload: ProofPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload, ProofPayload::Screenshot { .. }));

        let json = r#"{"kind":"channel_membership"}"#;
        let payload: ProofPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload, ProofPayload::ChannelMembership));
    }

    #[test]
    fn test_record_round_trip() {
        let record = ProofRecord {
            payload: Some(ProofPayload::SocialEngagement {
                post_url: Some("https://example.com/p/1".to_string()),
            }),
            verifier_message: Some("follow confirmed".to_string()),
            review_reason: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        let back: ProofRecord = serde_json::from_value(json).unwrap();
        assert!(!back.is_empty());
        assert_eq!(back.verifier_message.as_deref(), Some("follow confirmed"));
    }

    #[test]
    fn test_empty_record() {
        assert!(ProofRecord::default().is_empty());
    }
}
