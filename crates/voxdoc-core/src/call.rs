//! Push-to-talk call state machine.
//!
//! One CallController exists process-wide. A call walks
//! Idle → Connected, then loops Connected → Listening → Processing →
//! Speaking → Connected per turn, and ends terminally in Ended.
//! The guards here are what keep overlapping recordings and stale
//! pipeline results from corrupting the turn sequence: only one
//! utterance is ever in flight, and every suspension point re-checks
//! the machine state before applying its result.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::{select, Either};
use uuid::Uuid;

use voxdoc_types::{
    call::{elapsed_seconds, format_elapsed, CallState, TurnEntry},
    event::{AppEvent, NoticeLevel},
    Result, VoxError,
};

use crate::event_bus::EventBus;
use crate::playback::AudioPlayback;
use crate::ports::{CallPipelinePort, CapturePort, TickerHandle, TimerPort};

/// Call clock period
const TICK_MS: u32 = 1_000;

/// Bound on one Processing phase; expiry returns the call to Connected
/// with an error entry instead of wedging the turn guard forever.
const TURN_TIMEOUT_MS: u32 = 45_000;

/// Observable state of one call session. Ephemeral: it is never
/// persisted, and a new call replaces it wholesale.
#[derive(Debug, Clone)]
pub struct CallMachine {
    pub call_id: String,
    pub state: CallState,
    pub document_id: Option<String>,
    pub language: String,
    pub voice_id: String,
    pub muted: bool,
    pub turn_log: Vec<TurnEntry>,
    pub started_at: Option<DateTime<Utc>>,
}

impl CallMachine {
    fn idle() -> Self {
        Self {
            call_id: String::new(),
            state: CallState::Idle,
            document_id: None,
            language: String::new(),
            voice_id: String::new(),
            muted: false,
            turn_log: Vec::new(),
            started_at: None,
        }
    }

    fn connect(document_id: &str, language: &str, voice_id: &str) -> Self {
        Self {
            call_id: Uuid::new_v4().to_string(),
            state: CallState::Connected,
            document_id: Some(document_id.to_string()),
            language: language.to_string(),
            voice_id: voice_id.to_string(),
            muted: false,
            turn_log: Vec::new(),
            started_at: Some(Utc::now()),
        }
    }

    /// Call clock, recomputed from the wall clock so it cannot drift.
    pub fn elapsed_label(&self, now: DateTime<Utc>) -> Option<String> {
        self.started_at
            .map(|started_at| format_elapsed(elapsed_seconds(started_at, now)))
    }
}

pub struct CallController {
    machine: Rc<RefCell<CallMachine>>,
    capture: Rc<dyn CapturePort>,
    pipeline: Rc<dyn CallPipelinePort>,
    playback: Rc<AudioPlayback>,
    timer: Rc<dyn TimerPort>,
    events: EventBus,
    ticker: RefCell<Option<TickerHandle>>,
    turn_timeout_ms: u32,
}

impl CallController {
    pub fn new(
        capture: Rc<dyn CapturePort>,
        pipeline: Rc<dyn CallPipelinePort>,
        playback: Rc<AudioPlayback>,
        timer: Rc<dyn TimerPort>,
        events: EventBus,
    ) -> Self {
        Self {
            machine: Rc::new(RefCell::new(CallMachine::idle())),
            capture,
            pipeline,
            playback,
            timer,
            events,
            ticker: RefCell::new(None),
            turn_timeout_ms: TURN_TIMEOUT_MS,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────

    /// Start a fresh call against a bound document. Rejected while a
    /// call is active; a call cannot exist without document context.
    pub fn start_call(
        &self,
        document_id: Option<&str>,
        language: &str,
        voice_id: &str,
    ) -> Result<()> {
        if self.machine.borrow().state.is_active() {
            return Err(VoxError::CallAlreadyActive);
        }
        let Some(document_id) = document_id else {
            return Err(VoxError::NoDocument);
        };
        *self.machine.borrow_mut() = CallMachine::connect(document_id, language, voice_id);
        self.emit_state(CallState::Connected);
        self.start_clock();
        log::info!("Call started against document {}", document_id);
        Ok(())
    }

    /// Tear the call down from any state. Recording and playback stop
    /// now; an in-flight pipeline call is left to resolve and its
    /// result discarded on arrival. Idempotent.
    pub fn end_call(&self) {
        {
            let mut m = self.machine.borrow_mut();
            if !m.state.is_active() {
                return;
            }
            m.state = CallState::Ended;
            m.document_id = None;
            m.started_at = None;
        }
        self.capture.cancel();
        self.playback.stop();
        // Dropping the handle stops the clock with the call
        self.ticker.borrow_mut().take();
        self.emit_state(CallState::Ended);
        log::info!("Call ended");
    }

    /// Mute is per-turn: it suppresses playback of results already
    /// obtained, it does not cancel in-flight synthesis.
    pub fn set_muted(&self, muted: bool) {
        self.machine.borrow_mut().muted = muted;
    }

    // ─── Turn taking ─────────────────────────────────────────

    /// Press-and-hold start. A no-op unless the call is Connected:
    /// repeat presses while Listening are idempotent, and presses
    /// while Processing or Speaking are rejected so only one utterance
    /// is ever in flight.
    pub async fn begin_capture(&self) {
        if self.machine.borrow().state != CallState::Connected {
            return;
        }
        match self.capture.start().await {
            Ok(()) => {
                let armed = {
                    let mut m = self.machine.borrow_mut();
                    if m.state == CallState::Connected {
                        m.state = CallState::Listening;
                        true
                    } else {
                        false
                    }
                };
                if armed {
                    self.emit_state(CallState::Listening);
                } else {
                    // The call ended while the device was being acquired
                    self.capture.cancel();
                }
            }
            Err(e) => {
                self.events.emit(AppEvent::Notice {
                    level: NoticeLevel::Warning,
                    text: format!("Microphone unavailable: {}", e),
                });
            }
        }
    }

    /// Release: run the captured utterance through the remote
    /// transcribe → answer → synthesize pipeline, then play the reply
    /// (or skip it when muted) and return to Connected. A single turn
    /// failure logs a system entry; it never terminates the call.
    pub async fn end_capture(&self) {
        {
            let mut m = self.machine.borrow_mut();
            if m.state != CallState::Listening {
                return;
            }
            m.state = CallState::Processing;
        }
        self.emit_state(CallState::Processing);

        // The device is released the instant capture ends, regardless
        // of what happens downstream
        let audio = match self.capture.stop().await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_turn(&format!("Capture failed: {}", e));
                return;
            }
        };

        let (document_id, language, voice_id) = {
            let m = self.machine.borrow();
            (m.document_id.clone(), m.language.clone(), m.voice_id.clone())
        };
        let Some(document_id) = document_id else {
            // end_call raced us while the recorder was stopping
            return;
        };

        let outcome = {
            let turn = self
                .pipeline
                .call_turn(&audio, &document_id, &language, &voice_id);
            futures::pin_mut!(turn);
            let timeout = self.timer.sleep(self.turn_timeout_ms);
            match select(turn, timeout).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(VoxError::Timeout(self.turn_timeout_ms as u64)),
            }
        };

        // A result arriving after endCall is discarded untouched
        if self.machine.borrow().state != CallState::Processing {
            log::info!("Discarding pipeline result; call is no longer processing");
            return;
        }

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                self.fail_turn(&e.to_string());
                return;
            }
        };

        // Both halves of the turn land atomically, then we speak
        let (user_entry, assistant_entry) = {
            let mut m = self.machine.borrow_mut();
            let user_entry = TurnEntry::user(&reply.recognized_text);
            let assistant_entry = TurnEntry::assistant(&reply.response_text);
            m.turn_log.push(user_entry.clone());
            m.turn_log.push(assistant_entry.clone());
            m.state = CallState::Speaking;
            (user_entry, assistant_entry)
        };
        self.events.emit(AppEvent::TurnLogged { entry: user_entry });
        self.events.emit(AppEvent::TurnLogged {
            entry: assistant_entry,
        });
        self.emit_state(CallState::Speaking);

        let muted = self.machine.borrow().muted;
        match reply.audio_ref {
            Some(ref audio_ref) if !muted => {
                let events = self.events.clone();
                let observed_ref = audio_ref.clone();
                self.playback
                    .play(
                        audio_ref,
                        Rc::new(move |state| {
                            events.emit(AppEvent::PlaybackChanged {
                                audio_ref: observed_ref.clone(),
                                state,
                            });
                        }),
                    )
                    .await;
            }
            _ => {}
        }

        // Speaking → Connected on completion, error, or mute skip;
        // unless the call ended while the reply was playing
        let reconnected = {
            let mut m = self.machine.borrow_mut();
            if m.state == CallState::Speaking {
                m.state = CallState::Connected;
                true
            } else {
                false
            }
        };
        if reconnected {
            self.emit_state(CallState::Connected);
        }
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn state(&self) -> CallState {
        self.machine.borrow().state
    }

    pub fn snapshot(&self) -> CallMachine {
        self.machine.borrow().clone()
    }

    // ─── Internals ───────────────────────────────────────────

    /// Record a failed turn and hand the floor back to the user.
    fn fail_turn(&self, detail: &str) {
        let entry = {
            let mut m = self.machine.borrow_mut();
            if m.state != CallState::Processing {
                return;
            }
            let entry = TurnEntry::system(detail);
            m.turn_log.push(entry.clone());
            m.state = CallState::Connected;
            entry
        };
        log::warn!("Call turn failed: {}", detail);
        self.events.emit(AppEvent::TurnLogged { entry });
        self.emit_state(CallState::Connected);
    }

    fn start_clock(&self) {
        let machine = Rc::clone(&self.machine);
        let events = self.events.clone();
        let handle = self.timer.every(
            TICK_MS,
            Box::new(move || {
                let m = machine.borrow();
                if !m.state.is_active() {
                    return;
                }
                if let Some(label) = m.elapsed_label(Utc::now()) {
                    events.emit(AppEvent::CallTick { label });
                }
            }),
        );
        *self.ticker.borrow_mut() = Some(handle);
    }

    fn emit_state(&self, state: CallState) {
        self.events.emit(AppEvent::CallStateChanged { state });
    }
}
