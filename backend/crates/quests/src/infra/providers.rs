//! Verification Provider Adapters
//!
//! Thin HTTP clients against the internal verification gateway, which
//! fronts the actual chat/social/AI services. Transport problems map to
//! `ProviderError::Unavailable` so the state machine treats them as
//! retryable, never as rejections.

use async_trait::async_trait;
use kernel::id::UserId;
use serde::Deserialize;
use std::time::Duration;

use crate::verifier::{
    ChatMembershipApi, Classification, ImageClassifier, ProviderError, SocialGraphApi,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the verification gateway
#[derive(Clone)]
pub struct HttpProviderGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProviderGateway {
    pub fn new(base_url: String) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Invalid(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if response.status().is_server_error() {
            return Err(ProviderError::Unavailable(format!(
                "gateway returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(ProviderError::Invalid(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }
}

#[derive(Deserialize)]
struct BoolResponse {
    result: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BioResponse {
    bio: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResponse {
    approved: bool,
    confidence: f32,
    needs_manual_review: bool,
    #[serde(default)]
    summary: Option<String>,
}

#[async_trait]
impl ChatMembershipApi for HttpProviderGateway {
    async fn is_member(&self, channel_id: &str, user_id: UserId) -> Result<bool, ProviderError> {
        let response: BoolResponse = self
            .post_json(
                "/membership/check",
                serde_json::json!({
                    "channelId": channel_id,
                    "userId": user_id.as_uuid(),
                }),
            )
            .await?;
        Ok(response.result)
    }
}

#[async_trait]
impl SocialGraphApi for HttpProviderGateway {
    async fn follows(&self, external_id: &str, target_handle: &str) -> Result<bool, ProviderError> {
        let response: BoolResponse = self
            .post_json(
                "/social/follows",
                serde_json::json!({
                    "externalId": external_id,
                    "target": target_handle,
                }),
            )
            .await?;
        Ok(response.result)
    }

    async fn has_retweeted(
        &self,
        external_id: &str,
        post_url: &str,
    ) -> Result<bool, ProviderError> {
        let response: BoolResponse = self
            .post_json(
                "/social/retweeted",
                serde_json::json!({
                    "externalId": external_id,
                    "postUrl": post_url,
                }),
            )
            .await?;
        Ok(response.result)
    }

    async fn profile_bio(&self, external_id: &str) -> Result<String, ProviderError> {
        let response: BioResponse = self
            .post_json(
                "/social/profile",
                serde_json::json!({ "externalId": external_id }),
            )
            .await?;
        Ok(response.bio)
    }
}

#[async_trait]
impl ImageClassifier for HttpProviderGateway {
    async fn classify(
        &self,
        image_b64: &str,
        quest_title: &str,
    ) -> Result<Classification, ProviderError> {
        let response: ClassifyResponse = self
            .post_json(
                "/classify/screenshot",
                serde_json::json!({
                    "imageB64": image_b64,
                    "questTitle": quest_title,
                }),
            )
            .await?;

        Ok(Classification {
            approved: response.approved,
            confidence: response.confidence,
            needs_manual_review: response.needs_manual_review,
            summary: response.summary,
        })
    }
}
