use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of the push-to-talk call pipeline.
///
/// At most one call exists process-wide. `Ended` is terminal: a new call
/// starts from a fresh state rather than reviving the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    Idle,
    Connected,
    Listening,
    Processing,
    Speaking,
    Ended,
}

impl CallState {
    /// True while a call session exists and has not been torn down.
    pub fn is_active(&self) -> bool {
        !matches!(self, CallState::Idle | CallState::Ended)
    }
}

/// Who produced a turn-log entry. System entries carry error
/// descriptions for turns that failed in the remote pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
    System,
}

/// One entry in a call's turn log. The log is append-only and separate
/// from the session transcript; a call does not automatically persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TurnEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, text)
    }
}

/// Format a call duration as zero-padded `MM:SS`. There is no hour
/// component; past an hour the minutes simply keep counting.
pub fn format_elapsed(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Seconds elapsed since `started_at`, recomputed from the clock rather
/// than incremented, so the timer cannot drift.
pub fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - started_at).num_seconds().max(0) as u64
}
