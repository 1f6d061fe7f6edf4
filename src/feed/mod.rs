//! Feed abstraction: message types and the source/sink seam.
//!
//! The bot core never talks HTTP itself. It consumes a [`FeedSource`] for
//! fetching mentions and submitting signed replies; filtering and cursor
//! logic live in [`mentions`], provider-specific I/O in [`hub`].

pub mod hub;
pub mod mentions;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// One message fetched from the feed. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedMessage {
    /// Whether this is a content-add message with text, naming the bot.
    pub is_mention: bool,
    /// Text content of the message.
    pub content: String,
    /// Fid of the author.
    pub author: u64,
    /// Message hash; replies reference it as their parent.
    pub hash: Vec<u8>,
    /// Seconds since the feed epoch (feed time, not unix time).
    pub timestamp: u64,
}

/// A filtered batch of new mentions plus the advanced cursor.
#[derive(Debug, Clone)]
pub struct MentionBatch {
    /// Qualifying mentions in fetch order.
    pub messages: Vec<FeedMessage>,
    /// Absolute unix timestamp of the newest qualifying message.
    pub cursor: u64,
}

/// Source of mentions and sink for signed replies.
///
/// Implementations do pure I/O and may over-fetch; qualification and cursor
/// advancement are the caller's job.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Fetch mention messages, newest batch the provider has. `since` is in
    /// feed time and lets providers that support it skip old messages.
    async fn fetch_mentions(&self, since: u64) -> Result<Vec<FeedMessage>, FeedError>;

    /// Submit an encoded signed message to the feed.
    async fn submit(&self, message: Vec<u8>) -> Result<(), FeedError>;

    /// Release any underlying resources.
    async fn shutdown(&self) -> Result<(), FeedError> {
        Ok(())
    }
}
