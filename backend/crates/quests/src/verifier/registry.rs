//! Verifier Registry
//!
//! Verifiers are looked up by quest type instead of dispatched through a
//! growing conditional, so each one stays independently testable and new
//! quest types only touch the registration site.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::value_object::quest_type::QuestType;
use crate::verifier::membership::ChannelMembershipVerifier;
use crate::verifier::screenshot::ScreenshotVerifier;
use crate::verifier::social::{FollowVerifier, RetweetVerifier};
use crate::verifier::{ChatMembershipApi, ImageClassifier, SocialGraphApi, Verifier};

#[derive(Default)]
pub struct VerifierRegistry {
    verifiers: HashMap<QuestType, Arc<dyn Verifier>>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full production set, one verifier per quest type
    pub fn with_defaults(
        chat: Arc<dyn ChatMembershipApi>,
        social: Arc<dyn SocialGraphApi>,
        classifier: Arc<dyn ImageClassifier>,
        screenshot_confidence_threshold: f32,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ChannelMembershipVerifier::new(chat)));
        registry.register(Arc::new(FollowVerifier::new(social.clone())));
        registry.register(Arc::new(RetweetVerifier::new(social)));
        registry.register(Arc::new(ScreenshotVerifier::new(
            classifier,
            screenshot_confidence_threshold,
        )));
        registry
    }

    pub fn register(&mut self, verifier: Arc<dyn Verifier>) {
        self.verifiers.insert(verifier.quest_type(), verifier);
    }

    pub fn get(&self, quest_type: QuestType) -> Option<&Arc<dyn Verifier>> {
        self.verifiers.get(&quest_type)
    }
}
