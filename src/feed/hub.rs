//! Farcaster hub REST client.
//!
//! Implements [`FeedSource`] against a hub's HTTP API: mentions come from
//! `castsByMention`, signed replies go to `submitMessage`. Also exposes the
//! user-data lookups the frame resolver needs. Timestamps are passed
//! through in feed time; epoch conversion belongs to the caller.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::FeedError;
use crate::feed::{FeedMessage, FeedSource};

const ENDPOINT_CASTS_BY_MENTION: &str = "castsByMention";
const ENDPOINT_SUBMIT_MESSAGE: &str = "submitMessage";
const ENDPOINT_USERNAME_PROOFS: &str = "userNameProofsByFid";
const ENDPOINT_VERIFICATIONS: &str = "verificationsByFid";

/// Type tag of a cast-add message in hub JSON.
const MESSAGE_TYPE_CAST_ADD: &str = "MESSAGE_TYPE_CAST_ADD";
/// Type tag of an fname username proof.
const USERNAME_TYPE_FNAME: &str = "USERNAME_TYPE_FNAME";
/// Type tag of an eth-address verification message.
const MESSAGE_TYPE_VERIFICATION: &str = "MESSAGE_TYPE_VERIFICATION_ADD_ETH_ADDRESS";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const USERDATA_TIMEOUT: Duration = Duration::from_secs(15);

/// Hub HTTP client. Cheap to clone; the inner `reqwest::Client` is shared.
#[derive(Clone)]
pub struct HubClient {
    fid: u64,
    endpoint: String,
    auth: HashMap<String, String>,
    client: reqwest::Client,
}

impl HubClient {
    /// Create a client for the hub at `endpoint`, querying mentions of
    /// `fid`. `auth` entries are sent as static headers on every request.
    pub fn new(fid: u64, endpoint: impl Into<String>, auth: HashMap<String, String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            fid,
            endpoint,
            auth,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint)
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (header, value) in &self.auth {
            if header.is_empty() || value.is_empty() {
                continue;
            }
            req = req.header(header, value);
        }
        req
    }

    /// Fetch username and verified addresses for a user.
    pub async fn user_data(&self, fid: u64) -> Result<UserData, FeedError> {
        let proofs: ProofsResponse = self
            .get_json(
                &format!("{ENDPOINT_USERNAME_PROOFS}?fid={fid}"),
                USERDATA_TIMEOUT,
            )
            .await?;

        // Keep the most recent fname proof for this fid.
        let mut username = String::new();
        let mut custody_address = String::new();
        let mut latest = 0u64;
        for proof in proofs.proofs {
            if proof.kind != USERNAME_TYPE_FNAME || proof.fid != fid {
                continue;
            }
            if proof.timestamp > latest {
                latest = proof.timestamp;
                username = proof.name;
                custody_address = proof.owner;
            }
        }

        let verifications: VerificationsResponse = self
            .get_json(
                &format!("{ENDPOINT_VERIFICATIONS}?fid={fid}"),
                USERDATA_TIMEOUT,
            )
            .await?;
        let addresses = verifications
            .messages
            .into_iter()
            .filter_map(|m| m.data)
            .filter(|d| d.kind == MESSAGE_TYPE_VERIFICATION)
            .filter_map(|d| d.verification_add_eth_address_body)
            .map(|b| b.address)
            .collect();

        Ok(UserData {
            fid,
            username,
            custody_address,
            verifications: addresses,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, FeedError> {
        let res = self
            .with_auth(self.client.get(self.url(path)))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FeedError::Fetch(e.to_string()))?;
        if !res.status().is_success() {
            return Err(FeedError::Fetch(format!(
                "{} returned {}",
                path.split('?').next().unwrap_or(path),
                res.status()
            )));
        }
        res.json::<T>()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FeedSource for HubClient {
    fn name(&self) -> &str {
        "hub"
    }

    async fn fetch_mentions(&self, _since: u64) -> Result<Vec<FeedMessage>, FeedError> {
        // The hub endpoint has no since parameter; it returns the recent
        // mention set and the caller filters against its cursor.
        let response: MentionsResponse = self
            .get_json(
                &format!("{ENDPOINT_CASTS_BY_MENTION}?fid={}", self.fid),
                FETCH_TIMEOUT,
            )
            .await?;
        Ok(response
            .messages
            .into_iter()
            .filter_map(to_feed_message)
            .collect())
    }

    async fn submit(&self, message: Vec<u8>) -> Result<(), FeedError> {
        let res = self
            .with_auth(self.client.post(self.url(ENDPOINT_SUBMIT_MESSAGE)))
            .header("Content-Type", "application/octet-stream")
            .timeout(SUBMIT_TIMEOUT)
            .body(message)
            .send()
            .await
            .map_err(|e| FeedError::Submit(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(FeedError::Submit(format!("{status}: {body}")));
        }
        Ok(())
    }
}

/// Convert one hub JSON message into a [`FeedMessage`].
///
/// Messages without data or with an undecodable hash are dropped here;
/// they can never be replied to.
fn to_feed_message(message: HubMessage) -> Option<FeedMessage> {
    let data = message.data?;
    let hash = match hex::decode(message.hash.trim_start_matches("0x")) {
        Ok(hash) => hash,
        Err(e) => {
            warn!(hash = %message.hash, error = %e, "Dropping mention with undecodable hash");
            return None;
        }
    };
    let text = data.cast_add_body.map(|b| b.text).unwrap_or_default();
    let is_mention = data.kind == MESSAGE_TYPE_CAST_ADD && !text.is_empty();
    Some(FeedMessage {
        is_mention,
        content: text,
        author: data.fid,
        hash,
        timestamp: data.timestamp,
    })
}

/// Profile data for a feed user, as the frame builder wants it.
#[derive(Debug, Clone)]
pub struct UserData {
    pub fid: u64,
    pub username: String,
    /// Address that owns the username proof.
    pub custody_address: String,
    /// Verified eth addresses.
    pub verifications: Vec<String>,
}

// ── Hub JSON shapes ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MentionsResponse {
    #[serde(default)]
    messages: Vec<HubMessage>,
}

#[derive(Debug, Deserialize)]
struct HubMessage {
    data: Option<HubMessageData>,
    #[serde(default)]
    hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HubMessageData {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    fid: u64,
    #[serde(default)]
    timestamp: u64,
    cast_add_body: Option<HubCastAddBody>,
}

#[derive(Debug, Deserialize)]
struct HubCastAddBody {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ProofsResponse {
    #[serde(default)]
    proofs: Vec<UsernameProof>,
}

#[derive(Debug, Deserialize)]
struct UsernameProof {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    fid: u64,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    owner: String,
}

#[derive(Debug, Deserialize)]
struct VerificationsResponse {
    #[serde(default)]
    messages: Vec<VerificationMessage>,
}

#[derive(Debug, Deserialize)]
struct VerificationMessage {
    data: Option<VerificationData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationData {
    #[serde(rename = "type", default)]
    kind: String,
    verification_add_eth_address_body: Option<VerificationBody>,
}

#[derive(Debug, Deserialize)]
struct VerificationBody {
    #[serde(default)]
    address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cast_add_json() {
        let raw = r#"{
            "data": {
                "type": "MESSAGE_TYPE_CAST_ADD",
                "fid": 42,
                "timestamp": 1234,
                "network": "FARCASTER_NETWORK_MAINNET",
                "castAddBody": {"text": "!poll\nQ?\n- a\n- b"}
            },
            "hash": "0xd2b1ddc6c88e865a33cb1a565e0058d757042974"
        }"#;
        let message: HubMessage = serde_json::from_str(raw).unwrap();
        let feed = to_feed_message(message).unwrap();
        assert!(feed.is_mention);
        assert_eq!(feed.author, 42);
        assert_eq!(feed.timestamp, 1234);
        assert_eq!(feed.hash.len(), 20);
        assert!(feed.content.starts_with("!poll"));
    }

    #[test]
    fn non_cast_types_are_not_mentions() {
        let raw = r#"{
            "data": {"type": "MESSAGE_TYPE_REACTION_ADD", "fid": 1, "timestamp": 5},
            "hash": "0a0b"
        }"#;
        let message: HubMessage = serde_json::from_str(raw).unwrap();
        let feed = to_feed_message(message).unwrap();
        assert!(!feed.is_mention);
    }

    #[test]
    fn empty_text_is_not_a_mention() {
        let raw = r#"{
            "data": {
                "type": "MESSAGE_TYPE_CAST_ADD",
                "fid": 1,
                "timestamp": 5,
                "castAddBody": {"text": ""}
            },
            "hash": "0a0b"
        }"#;
        let message: HubMessage = serde_json::from_str(raw).unwrap();
        assert!(!to_feed_message(message).unwrap().is_mention);
    }

    #[test]
    fn undecodable_hash_drops_the_message() {
        let raw = r#"{
            "data": {"type": "MESSAGE_TYPE_CAST_ADD", "fid": 1, "timestamp": 5,
                     "castAddBody": {"text": "hi"}},
            "hash": "not-hex"
        }"#;
        let message: HubMessage = serde_json::from_str(raw).unwrap();
        assert!(to_feed_message(message).is_none());
    }

    #[test]
    fn missing_data_drops_the_message() {
        let message: HubMessage = serde_json::from_str(r#"{"hash": "0a"}"#).unwrap();
        assert!(to_feed_message(message).is_none());
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = HubClient::new(1, "https://hub.example/v1/", HashMap::new());
        assert_eq!(
            client.url("castsByMention"),
            "https://hub.example/v1/castsByMention"
        );
    }
}
