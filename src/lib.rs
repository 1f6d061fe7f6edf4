//! Pollcast — a Farcaster poll bot.
//!
//! Watches a hub for `!poll` mentions, turns them into voting frames
//! through a pluggable resolver, and replies with signed casts.

pub mod bot;
pub mod config;
pub mod error;
pub mod feed;
pub mod frames;
pub mod poll;
pub mod protocol;
