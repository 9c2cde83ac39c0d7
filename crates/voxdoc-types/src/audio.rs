use serde::{Deserialize, Serialize};

/// Why a playback attempt failed. Each kind maps to a distinct
/// user-facing message so the UI can explain without guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackErrorKind {
    FormatUnsupported,
    Network,
    Decode,
    Aborted,
    PermissionDenied,
}

impl PlaybackErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaybackErrorKind::FormatUnsupported => {
                "This audio format is not supported by your browser."
            }
            PlaybackErrorKind::Network => "Audio could not be fetched. Check your connection.",
            PlaybackErrorKind::Decode => "The audio file could not be decoded.",
            PlaybackErrorKind::Aborted => "Playback was interrupted.",
            PlaybackErrorKind::PermissionDenied => {
                "The browser blocked playback. Interact with the page and try again."
            }
        }
    }
}

/// Lifecycle of one audio rendition. `play` walks Loading → Playing →
/// one terminal state; a superseded or cancelled rendition terminates
/// with `Stopped` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Loading,
    Playing,
    Ended,
    Errored(PlaybackErrorKind),
    Stopped,
}

impl PlaybackState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackState::Ended | PlaybackState::Errored(_) | PlaybackState::Stopped
        )
    }
}
