//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `voxdoc-core` (pure Rust).
//! Implementations live in `voxdoc-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use voxdoc_types::{
    audio::PlaybackErrorKind, document::Document, message::Message, voice::VoiceProfile, Result,
};

// ─── Document Extraction Port ────────────────────────────────

#[async_trait(?Send)]
pub trait DocumentPort {
    /// Upload raw file bytes for extraction. The caller has already
    /// validated size and extension; the collaborator may still reject.
    async fn upload(&self, bytes: &[u8], filename: &str) -> Result<Document>;
}

// ─── Answer Generation Port ──────────────────────────────────

#[async_trait(?Send)]
pub trait AnswerPort {
    /// Ask a question against an optionally bound document, with a
    /// window of recent history for context. Returns the response text.
    async fn chat(
        &self,
        message: &str,
        file_id: Option<&str>,
        language: &str,
        history: &[Message],
    ) -> Result<String>;
}

// ─── Call Pipeline Port ──────────────────────────────────────

/// Result of one hands-free call turn: transcription, answer, and an
/// optional playable rendition of the answer.
#[derive(Debug, Clone)]
pub struct CallTurnReply {
    pub recognized_text: String,
    pub response_text: String,
    /// Absent when synthesis was unavailable for this turn
    pub audio_ref: Option<String>,
}

#[async_trait(?Send)]
pub trait CallPipelinePort {
    /// Send one captured utterance through transcribe → answer →
    /// synthesize. The single network crossing of the call machine.
    async fn call_turn(
        &self,
        audio: &[u8],
        file_id: &str,
        language: &str,
        voice_id: &str,
    ) -> Result<CallTurnReply>;
}

// ─── Voice Catalog Port ──────────────────────────────────────

#[async_trait(?Send)]
pub trait VoiceCatalogPort {
    /// List voices, optionally filtered by language. Returns an empty
    /// vec on any provider failure, never an error; callers fall back
    /// to the static table.
    async fn list_voices(&self, language: Option<&str>) -> Vec<VoiceProfile>;
}

// ─── Remote Synthesis Port ───────────────────────────────────

/// Raw synthesis result from the remote provider.
#[derive(Debug, Clone)]
pub enum RawSynthesis {
    /// A playable audio reference
    Audio { audio_ref: String },
    /// The provider answered with a fallback-text artifact instead of audio
    FallbackText { detail: String },
}

#[async_trait(?Send)]
pub trait SynthesisPort {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: &str,
        speed: f32,
    ) -> Result<RawSynthesis>;
}

// ─── Local Alternate Synthesis Port ──────────────────────────

pub trait LocalSpeechPort {
    /// Speak immediately through the runtime's own synthesis; no
    /// replayable reference is produced. Errors only when the runtime
    /// lacks the capability.
    fn speak(&self, text: &str, language: &str, voice_hint: Option<&str>) -> Result<()>;

    /// Cancel any utterance in progress. Safe to call when idle.
    fn cancel(&self);
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Audio Sink Port ─────────────────────────────────────────

/// Lifecycle event of the audio element behind the sink.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    /// Enough data buffered; playback has started
    Loaded,
    /// The rendition played to completion
    Ended,
    /// The rendition failed
    Error(PlaybackErrorKind),
}

pub trait AudioSinkPort {
    /// Begin loading and playing `url`. Returns the event stream for
    /// this rendition; starting a new one closes the previous stream.
    fn play(&self, url: &str) -> Pin<Box<dyn Stream<Item = SinkEvent>>>;

    /// Stop whatever is playing. Idempotent.
    fn stop(&self);

    fn is_playing(&self) -> bool;
}

// ─── Microphone Capture Port ─────────────────────────────────

#[async_trait(?Send)]
pub trait CapturePort {
    /// Acquire the capture device and begin recording.
    async fn start(&self) -> Result<()>;

    /// Stop recording, release the device immediately, and return the
    /// captured bytes.
    async fn stop(&self) -> Result<Vec<u8>>;

    /// Stop and discard without returning bytes. Safe when idle.
    fn cancel(&self);

    fn is_capturing(&self) -> bool;
}

// ─── Timer Port ──────────────────────────────────────────────

/// Handle for a periodic task. Dropping it cancels the task, which ties
/// the timer's lifetime to whatever owns the handle.
pub struct TickerHandle {
    _guard: Box<dyn std::any::Any>,
}

impl TickerHandle {
    pub fn new(guard: impl std::any::Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

pub trait TimerPort {
    /// Invoke `tick` every `period_ms` until the handle is dropped.
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> TickerHandle;

    /// Resolve after `ms` milliseconds.
    fn sleep(&self, ms: u32) -> Pin<Box<dyn Future<Output = ()>>>;
}
