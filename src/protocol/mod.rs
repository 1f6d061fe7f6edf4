//! Farcaster wire protocol: epoch handling, protobuf types, signing.

pub mod signer;
pub mod wire;

pub use signer::{SignedReply, Signer};

/// Seconds between the unix epoch and the Farcaster epoch
/// (2021-01-01 00:00:00 UTC). Feed timestamps count from the latter.
pub const FARCASTER_EPOCH: u64 = 1_609_459_200;

/// Convert an absolute unix timestamp to feed time.
///
/// This is the only place the epoch is subtracted; callers apply it exactly
/// once when crossing the feed boundary. Timestamps predating the epoch
/// clamp to zero.
pub fn to_feed_time(unix_secs: u64) -> u64 {
    unix_secs.saturating_sub(FARCASTER_EPOCH)
}

/// Convert a feed timestamp back to absolute unix time.
pub fn from_feed_time(feed_secs: u64) -> u64 {
    feed_secs + FARCASTER_EPOCH
}

/// Current wall-clock time expressed in feed time.
pub fn now_feed_time() -> u64 {
    to_feed_time(chrono::Utc::now().timestamp().max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_time_round_trips() {
        let unix = FARCASTER_EPOCH + 12_345;
        assert_eq!(to_feed_time(unix), 12_345);
        assert_eq!(from_feed_time(12_345), unix);
        assert_eq!(from_feed_time(to_feed_time(unix)), unix);
    }

    #[test]
    fn pre_epoch_clamps_to_zero() {
        assert_eq!(to_feed_time(0), 0);
        assert_eq!(to_feed_time(FARCASTER_EPOCH - 1), 0);
        assert_eq!(to_feed_time(FARCASTER_EPOCH), 0);
    }

    #[test]
    fn now_is_past_the_epoch() {
        assert!(now_feed_time() > 0);
    }
}
