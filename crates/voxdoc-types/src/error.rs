use thiserror::Error;

use crate::audio::PlaybackErrorKind;

#[derive(Error, Debug, Clone)]
pub enum VoxError {
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Answer error: {0}")]
    Answer(String),

    #[error("Call pipeline error: {0}")]
    Pipeline(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Playback error: {}", .0.user_message())]
    Playback(PlaybackErrorKind),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown session: {0}")]
    SessionNotFound(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("A call is already active")]
    CallAlreadyActive,

    #[error("A call requires a bound document")]
    NoDocument,

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Not supported in this environment: {0}")]
    Unsupported(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for VoxError {
    fn from(e: serde_json::Error) -> Self {
        VoxError::Serialization(e.to_string())
    }
}
