//! Poll command parser.
//!
//! Mentions that carry a poll request follow a line-oriented format:
//!
//! ```text
//! !poll
//! <question, one or more lines>
//! - <option 1>
//! - <option 2>
//! - <option 3*>
//! - <option 4*>
//! <duration*>
//! ```
//!
//! The duration line is optional and defaults to 24 hours. Anything after an
//! explicit duration line is ignored.

use std::time::Duration;

use crate::error::ParseError;

/// Literal command token that must open the message.
const COMMAND: &str = "!poll";

/// Marker that starts an option line.
const OPTION_PREFIX: &str = "-";

/// Minimum number of options a poll must carry.
const MIN_OPTIONS: usize = 2;

/// Maximum number of options a poll may carry.
const MAX_OPTIONS: usize = 4;

/// Duration used when the message carries no explicit duration line.
const DEFAULT_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// A parsed poll request, ready for resolution.
///
/// Option order is preserved exactly as written in the mention; downstream
/// display depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    /// Fid of the mention's author.
    pub author: u64,
    /// Hash of the mention the reply will be parented to.
    pub message_hash: Vec<u8>,
    /// Question text, trailing line break trimmed.
    pub question: String,
    /// Between `MIN_OPTIONS` and `MAX_OPTIONS` entries, in encounter order.
    pub options: Vec<String>,
    /// How long the poll stays open.
    pub duration: Duration,
}

/// Scanner state while walking the mention line by line.
enum ScanState {
    /// Command token not seen yet.
    Seeking,
    /// Accumulating question lines.
    InQuestion,
    /// Collecting option lines; a plain line here is a duration.
    InOptions,
}

/// Parse a mention's text into a [`Poll`].
///
/// Blank lines are skipped everywhere. The first non-blank line must be the
/// command token. Question lines accumulate until the first option line;
/// an optional trailing plain line is parsed as a duration and ends the
/// scan.
pub fn parse_poll(author: u64, message_hash: &[u8], text: &str) -> Result<Poll, ParseError> {
    let mut state = ScanState::Seeking;
    let mut question = String::new();
    let mut options: Vec<String> = Vec::new();
    let mut duration = DEFAULT_DURATION;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match state {
            ScanState::Seeking => {
                if line != COMMAND {
                    return Err(ParseError::UnrecognisedCommand);
                }
                state = ScanState::InQuestion;
            }
            ScanState::InQuestion => {
                if let Some(rest) = line.strip_prefix(OPTION_PREFIX) {
                    // First option line; do not discard it.
                    options.push(rest.trim().to_string());
                    state = ScanState::InOptions;
                } else {
                    question.push_str(line);
                    question.push('\n');
                }
            }
            ScanState::InOptions => {
                if let Some(rest) = line.strip_prefix(OPTION_PREFIX) {
                    if options.len() >= MAX_OPTIONS {
                        return Err(ParseError::TooManyOptions { max: MAX_OPTIONS });
                    }
                    options.push(rest.trim().to_string());
                } else {
                    duration = parse_duration_str(line)
                        .ok_or_else(|| ParseError::InvalidDuration(line.to_string()))?;
                    // An explicit duration ends scanning.
                    break;
                }
            }
        }
    }

    if question.is_empty() {
        return Err(ParseError::QuestionMissing);
    }
    if options.len() < MIN_OPTIONS {
        return Err(ParseError::TooFewOptions { min: MIN_OPTIONS });
    }

    Ok(Poll {
        author,
        message_hash: message_hash.to_vec(),
        question: question.trim_end_matches('\n').to_string(),
        options,
        duration,
    })
}

/// Parse a compact duration string such as `"30m"`, `"24h"` or `"1h30m"`.
///
/// Accepts one or more `<value><unit>` segments where the value may carry a
/// decimal part and the unit is one of `ms`, `s`, `m`, `h`. Returns `None`
/// for anything else.
fn parse_duration_str(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let bytes = s.as_bytes();
    let mut total = Duration::ZERO;
    let mut i = 0;
    while i < s.len() {
        let start = i;
        while i < s.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == start {
            return None;
        }
        let value: f64 = s[start..i].parse().ok()?;
        let unit_start = i;
        while i < s.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let per_unit = match &s[unit_start..i] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += Duration::try_from_secs_f64(value * per_unit).ok()?;
    }
    Some(total)
}
