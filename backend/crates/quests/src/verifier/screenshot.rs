//! Screenshot Verifier
//!
//! Delegates to the AI classification collaborator. A confident approval
//! grants synchronously; anything the classifier is unsure about goes to
//! the admin review queue instead of being trusted either way.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;

use crate::domain::value_object::proof::ProofPayload;
use crate::domain::value_object::quest_type::QuestType;
use crate::verifier::{ImageClassifier, VerificationRequest, Verdict, Verifier, VerifierError};

pub struct ScreenshotVerifier {
    classifier: Arc<dyn ImageClassifier>,
    confidence_threshold: f32,
}

impl ScreenshotVerifier {
    pub fn new(classifier: Arc<dyn ImageClassifier>, confidence_threshold: f32) -> Self {
        Self {
            classifier,
            confidence_threshold,
        }
    }
}

#[async_trait]
impl Verifier for ScreenshotVerifier {
    fn quest_type(&self) -> QuestType {
        QuestType::ScreenshotProof
    }

    async fn verify(&self, req: VerificationRequest<'_>) -> Result<Verdict, VerifierError> {
        let Some(ProofPayload::Screenshot { image_b64, .. }) = req.payload else {
            return Ok(Verdict::Rejected {
                message: "screenshot proof required".to_string(),
            });
        };

        if general_purpose::STANDARD.decode(image_b64).is_err() {
            return Ok(Verdict::Rejected {
                message: "invalid image encoding".to_string(),
            });
        }

        let result = self
            .classifier
            .classify(image_b64, &req.quest.title)
            .await?;

        tracing::debug!(
            quest_id = %req.quest.quest_id,
            approved = result.approved,
            confidence = result.confidence,
            needs_manual_review = result.needs_manual_review,
            "Screenshot classified"
        );

        if result.needs_manual_review || result.confidence < self.confidence_threshold {
            return Ok(Verdict::NeedsReview {
                message: result.summary,
            });
        }

        if result.approved {
            Ok(Verdict::Approved {
                message: result.summary,
            })
        } else {
            Ok(Verdict::Rejected {
                message: result
                    .summary
                    .unwrap_or_else(|| "screenshot does not show the completed task".to_string()),
            })
        }
    }
}
