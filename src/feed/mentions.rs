//! Mention cursor and filtering.
//!
//! The cursor is an absolute unix timestamp marking the newest message
//! already processed. The feed speaks feed time, so the cursor crosses the
//! epoch boundary exactly once in each direction here and nowhere else.

use tracing::debug;

use crate::error::FeedError;
use crate::feed::{FeedMessage, FeedSource, MentionBatch};
use crate::protocol::{from_feed_time, to_feed_time};

/// Pure filter over one fetched batch, in the feed-time domain.
///
/// A message qualifies iff it is a mention, carries non-empty text, and is
/// strictly newer than `since`. Returns the qualifying messages in
/// encounter order and the new watermark (`since` unchanged when nothing
/// qualifies).
pub fn filter_mentions(batch: Vec<FeedMessage>, since: u64) -> (Vec<FeedMessage>, u64) {
    let mut last = since;
    let qualifying: Vec<FeedMessage> = batch
        .into_iter()
        .filter(|m| m.is_mention && !m.content.is_empty() && m.timestamp > since)
        .inspect(|m| last = last.max(m.timestamp))
        .collect();
    (qualifying, last)
}

/// Run one poll cycle: fetch since the cursor, filter, advance.
///
/// `cursor` is absolute unix time. `Ok(None)` means no new mentions — the
/// expected steady state, never a failure — and leaves the cursor
/// unchanged. Transport and decode failures surface as [`FeedError`]; the
/// cursor is not advanced on that path either.
pub async fn poll_mentions(
    source: &dyn FeedSource,
    cursor: u64,
) -> Result<Option<MentionBatch>, FeedError> {
    let since = to_feed_time(cursor);
    let batch = source.fetch_mentions(since).await?;
    let fetched = batch.len();
    let (messages, last) = filter_mentions(batch, since);
    if messages.is_empty() {
        debug!(source = source.name(), fetched, "No new mentions");
        return Ok(None);
    }
    debug!(
        source = source.name(),
        fetched,
        qualifying = messages.len(),
        "New mentions"
    );
    Ok(Some(MentionBatch {
        messages,
        cursor: from_feed_time(last),
    }))
}
