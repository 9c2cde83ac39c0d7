//! Audio playback controller.
//!
//! Enforces the one invariant the per-message play buttons depend on:
//! at most one rendition plays at any instant, system-wide. A new
//! `play` is stop-then-start: the superseded rendition's callback
//! observes a single terminal `Stopped` so its button resets exactly
//! once, without queueing or polling.

use std::cell::Cell;
use std::rc::Rc;

use futures::StreamExt;

use voxdoc_types::audio::PlaybackState;

use crate::ports::{AudioSinkPort, SinkEvent};

/// Per-rendition state observer, usually bound to one message's button.
pub type StateCallback = Rc<dyn Fn(PlaybackState)>;

pub struct AudioPlayback {
    sink: Rc<dyn AudioSinkPort>,
    /// Bumped on every play/stop; a rendition whose generation is stale
    /// has been superseded and must resolve as Stopped.
    generation: Cell<u64>,
}

impl AudioPlayback {
    pub fn new(sink: Rc<dyn AudioSinkPort>) -> Self {
        Self {
            sink,
            generation: Cell::new(0),
        }
    }

    /// Play one audio reference, driving `on_state` through
    /// Loading → Playing → Ended | Errored | Stopped. Any rendition
    /// already in flight is stopped first and resolves as Stopped.
    pub async fn play(&self, audio_ref: &str, on_state: StateCallback) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        // Implicit interrupt: closes the previous rendition's stream
        self.sink.stop();
        on_state(PlaybackState::Loading);

        let mut events = self.sink.play(audio_ref);
        while let Some(event) = events.next().await {
            if self.generation.get() != generation {
                break;
            }
            match event {
                SinkEvent::Loaded => on_state(PlaybackState::Playing),
                SinkEvent::Ended => {
                    on_state(PlaybackState::Ended);
                    return;
                }
                SinkEvent::Error(kind) => {
                    log::warn!("Playback failed for {}: {}", audio_ref, kind.user_message());
                    on_state(PlaybackState::Errored(kind));
                    return;
                }
            }
        }
        // Stream closed early: superseded by a newer play, or stop()
        on_state(PlaybackState::Stopped);
    }

    /// Stop whatever is playing. Idempotent; safe when nothing is.
    pub fn stop(&self) {
        self.generation.set(self.generation.get() + 1);
        self.sink.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.sink.is_playing()
    }
}
