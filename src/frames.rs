//! Voting-frame resolver.
//!
//! Resolves a poll by asking an external frame-builder service to create a
//! voting frame for it, then returns the reply text embedding the frame
//! URL. Frame creation is asynchronous on the service side: `create`
//! returns an id, and `create/check/{id}` answers 204 until the frame is
//! ready.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::bot::Resolver;
use crate::feed::hub::HubClient;
use crate::poll::Poll;

const CREATE_TIMEOUT: Duration = Duration::from_secs(10);
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);
/// Delay between readiness checks while the service answers 204.
const CHECK_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Give up waiting for the frame after this many checks.
const CHECK_MAX_ATTEMPTS: u32 = 30;

/// Resolver that builds voting frames through an external service.
pub struct FrameResolver {
    endpoint: String,
    hub: Arc<HubClient>,
    client: reqwest::Client,
}

/// Payload for the frame-builder `create` endpoint.
#[derive(Debug, Serialize)]
struct FrameRequest<'a> {
    profile: Profile,
    question: &'a str,
    options: &'a [String],
    /// Poll duration in whole hours.
    duration: u64,
}

#[derive(Debug, Serialize)]
struct Profile {
    fid: u64,
    custody: String,
    verifications: Vec<String>,
}

impl FrameResolver {
    pub fn new(endpoint: impl Into<String>, hub: Arc<HubClient>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            hub,
            client: reqwest::Client::new(),
        }
    }

    /// Request frame creation and wait until the service reports it ready.
    /// Returns the frame URL.
    async fn build_frame(&self, request: &FrameRequest<'_>) -> anyhow::Result<String> {
        let res = self
            .client
            .post(format!("{}/create", self.endpoint))
            .json(request)
            .timeout(CREATE_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            bail!("frame create failed: {}", res.status());
        }
        let frame_id = res.text().await?.trim().to_string();
        if frame_id.is_empty() {
            bail!("frame create returned an empty id");
        }

        let check_url = format!("{}/create/check/{frame_id}", self.endpoint);
        for attempt in 1..=CHECK_MAX_ATTEMPTS {
            let res = self
                .client
                .get(&check_url)
                .timeout(CHECK_TIMEOUT)
                .send()
                .await?;
            if res.status() == reqwest::StatusCode::NO_CONTENT {
                debug!(frame_id = %frame_id, attempt, "Frame not ready yet");
                tokio::time::sleep(CHECK_RETRY_DELAY).await;
                continue;
            }
            if !res.status().is_success() {
                bail!("frame check failed: {}", res.status());
            }
            return Ok(format!("{}/{frame_id}", self.endpoint));
        }
        bail!("frame {frame_id} not ready after {CHECK_MAX_ATTEMPTS} checks")
    }
}

#[async_trait]
impl Resolver for FrameResolver {
    async fn resolve(&self, poll: &Poll) -> anyhow::Result<String> {
        let author = self.hub.user_data(poll.author).await?;
        let request = FrameRequest {
            profile: Profile {
                fid: author.fid,
                custody: author.custody_address,
                verifications: author.verifications,
            },
            question: &poll.question,
            options: &poll.options,
            duration: poll.duration.as_secs() / 3600,
        };
        let url = self.build_frame(&request).await?;
        info!(author = poll.author, url = %url, "Voting frame created");
        Ok(format!("Here is your poll 🗳️ frame! {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_request_serializes_the_expected_shape() {
        let options = vec!["Pizza".to_string(), "Salad".to_string()];
        let request = FrameRequest {
            profile: Profile {
                fid: 42,
                custody: "0xabc".into(),
                verifications: vec!["0xdef".into()],
            },
            question: "Lunch?",
            options: &options,
            duration: 24,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["profile"]["fid"], 42);
        assert_eq!(json["profile"]["custody"], "0xabc");
        assert_eq!(json["question"], "Lunch?");
        assert_eq!(json["options"][1], "Salad");
        assert_eq!(json["duration"], 24);
    }

    #[test]
    fn duration_truncates_to_whole_hours() {
        let duration = Duration::from_secs(24 * 3600 + 1800);
        assert_eq!(duration.as_secs() / 3600, 24);
    }
}
