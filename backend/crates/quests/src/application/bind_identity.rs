//! Bind Identity Use Case
//!
//! Two-step binding of an external social account: issue a short-lived
//! code the user places in their profile, then confirm by reading the
//! profile back through the social provider. Codes live in storage with a
//! TTL and are consumed atomically, so the flow survives restarts and
//! concurrent confirm attempts.

use std::sync::Arc;

use kernel::id::UserId;
use uuid::Uuid;

use crate::application::config::QuestConfig;
use crate::domain::entity::social_identity::{SocialIdentityBinding, VerificationCode};
use crate::domain::repository::SocialIdentityRepository;
use crate::domain::services;
use crate::error::{QuestError, QuestResult};
use crate::verifier::{ProviderError, SocialGraphApi};

const PROVIDER: &str = "twitter";

/// Output of issuing a code
#[derive(Debug, Clone)]
pub struct IssueCodeOutput {
    pub code: String,
    pub expires_at_ms: i64,
}

/// Bind Identity Use Case
pub struct BindIdentityUseCase<R>
where
    R: SocialIdentityRepository,
{
    repo: Arc<R>,
    social: Arc<dyn SocialGraphApi>,
    config: Arc<QuestConfig>,
}

impl<R> BindIdentityUseCase<R>
where
    R: SocialIdentityRepository,
{
    pub fn new(repo: Arc<R>, social: Arc<dyn SocialGraphApi>, config: Arc<QuestConfig>) -> Self {
        Self {
            repo,
            social,
            config,
        }
    }

    /// Issue a fresh code, replacing any pending one
    pub async fn issue_code(&self, user_id: Uuid) -> QuestResult<IssueCodeOutput> {
        let user_id = UserId::from_uuid(user_id);
        let code = VerificationCode::new(
            user_id,
            services::generate_binding_code(),
            self.config.binding_code_ttl_ms(),
        );
        self.repo.put_code(&code).await?;

        tracing::info!(user_id = %user_id, "Identity binding code issued");

        Ok(IssueCodeOutput {
            code: code.code,
            expires_at_ms: code.expires_at_ms,
        })
    }

    /// Confirm the binding: the code must appear in the external profile.
    /// The code is consumed on the attempt, success or not.
    pub async fn confirm(&self, user_id: Uuid, external_id: String) -> QuestResult<()> {
        let user_id = UserId::from_uuid(user_id);

        let code = self
            .repo
            .take_valid_code(user_id)
            .await?
            .ok_or(QuestError::BindingCodeInvalid)?;

        let bio = self
            .social
            .profile_bio(&external_id)
            .await
            .map_err(|e| match e {
                ProviderError::Unavailable(msg) => QuestError::VerificationUnavailable(msg),
                ProviderError::Invalid(msg) => QuestError::Internal(msg),
            })?;

        if !bio.contains(&code.code) {
            tracing::warn!(user_id = %user_id, "Binding code not found in profile");
            return Err(QuestError::BindingCodeMismatch);
        }

        let binding = SocialIdentityBinding::new(user_id, PROVIDER, external_id);
        self.repo.save_binding(&binding).await?;

        tracing::info!(
            user_id = %user_id,
            external_id = %binding.external_id,
            "Social identity bound"
        );
        Ok(())
    }
}
