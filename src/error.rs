//! Error types for pollcast.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Poll parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Configuration-related errors — the only class that is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Bot fid must be non-zero")]
    ZeroFid,

    #[error("Signing seed not set")]
    MissingSeed,

    #[error("Invalid signing seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Feed transport errors. All are transient: the poll stage retries
/// naturally on its next tick and the cursor is never advanced on the
/// fetch path.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Mention fetch failed: {0}")]
    Fetch(String),

    #[error("Feed response decode failed: {0}")]
    Decode(String),

    #[error("Message submit failed: {0}")]
    Submit(String),
}

/// Poll command parse errors. Per-message and non-fatal: the offending
/// mention is dropped and the batch continues.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognised command")]
    UnrecognisedCommand,

    #[error("Question content not set")]
    QuestionMissing,

    #[error("Min number of options not reached: {min}")]
    TooFewOptions { min: usize },

    #[error("Max number of options reached: {max}")]
    TooManyOptions { max: usize },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// Wire-protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Signing seed must be {expected} bytes, got {actual}")]
    SeedLength { expected: usize, actual: usize },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
