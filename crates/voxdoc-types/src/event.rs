use serde::{Deserialize, Serialize};

use crate::audio::PlaybackState;
use crate::call::{CallState, TurnEntry};
use crate::document::Document;
use crate::message::Message;
use crate::session::Session;

/// Severity of a transient user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Events emitted by the orchestration core.
/// The presentation layer drains these for reactive updates; the core
/// never touches a rendering surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// A new session was created and made active
    SessionCreated { id: String },

    /// The active session changed; carries the full session to render
    SessionChanged { session: Session },

    /// A session was deleted
    SessionDeleted { id: String },

    /// Explicit empty state after the last session is gone
    ActiveCleared,

    /// A message was appended to a session
    MessageAppended { session_id: String, message: Message },

    /// A document was bound to a session
    DocumentBound { session_id: String, document: Document },

    /// A playback state transition for one audio rendition
    PlaybackChanged { audio_ref: String, state: PlaybackState },

    /// The call state machine moved
    CallStateChanged { state: CallState },

    /// An entry was appended to the call turn log
    TurnLogged { entry: TurnEntry },

    /// Call clock tick, preformatted as MM:SS
    CallTick { label: String },

    /// A transient notice to surface to the user
    Notice { level: NoticeLevel, text: String },
}
