//! Notification seam
//!
//! Fire-and-forget reward notifications. Failures are logged by the
//! caller and never propagate into the reward path.

use async_trait::async_trait;
use kernel::id::UserId;

use crate::verifier::ProviderError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_reward_granted(
        &self,
        user_id: UserId,
        quest_title: &str,
        amount: i64,
        asset: &str,
    ) -> Result<(), ProviderError>;
}

/// Default notifier that only logs; delivery is an external collaborator
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_reward_granted(
        &self,
        user_id: UserId,
        quest_title: &str,
        amount: i64,
        asset: &str,
    ) -> Result<(), ProviderError> {
        tracing::info!(
            user_id = %user_id,
            quest_title = %quest_title,
            amount = amount,
            asset = %asset,
            "Reward granted (notification no-op)"
        );
        Ok(())
    }
}
