//! VoxDoc App — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer). It assembles
//! the platform adapters, constructs every core service exactly once,
//! and hands a thin facade to the page. The page renders; nothing
//! here does.

mod app;

use wasm_bindgen::prelude::*;

pub use app::AppContext;

/// WASM entry point — called when the module loads
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("VoxDoc WASM starting...");
}

/// JS-facing facade. All methods are fire-and-forget dispatches; the
/// page observes results by draining events each frame.
#[wasm_bindgen]
pub struct VoxDocApp {
    ctx: std::rc::Rc<AppContext>,
}

#[wasm_bindgen]
impl VoxDocApp {
    /// Build the application context: storage, config, services.
    pub async fn boot() -> VoxDocApp {
        VoxDocApp {
            ctx: AppContext::boot().await,
        }
    }

    // ─── Chat ────────────────────────────────────────────────

    pub fn send_message(&self, text: String) {
        self.ctx.dispatch_send(text);
    }

    pub fn attach_document(&self, bytes: Vec<u8>, filename: String) {
        self.ctx.dispatch_attach_document(bytes, filename);
    }

    // ─── Sessions ────────────────────────────────────────────

    pub fn new_session(&self) {
        self.ctx.dispatch_new_session();
    }

    pub fn switch_session(&self, id: String) {
        self.ctx.dispatch_set_active(id);
    }

    pub fn delete_session(&self, id: String) {
        self.ctx.dispatch_delete_session(id);
    }

    /// Session list as JSON, for the sidebar
    pub fn sessions(&self) -> String {
        self.ctx.sessions_json()
    }

    /// The active session as JSON, or "null"
    pub fn active_session(&self) -> String {
        self.ctx.active_session_json()
    }

    // ─── Playback ────────────────────────────────────────────

    pub fn play_message_audio(&self, audio_ref: String) {
        self.ctx.play_audio(audio_ref);
    }

    pub fn stop_audio(&self) {
        self.ctx.stop_audio();
    }

    // ─── Call ────────────────────────────────────────────────

    pub fn start_call(&self) {
        self.ctx.dispatch_start_call();
    }

    pub fn begin_capture(&self) {
        self.ctx.dispatch_begin_capture();
    }

    pub fn end_capture(&self) {
        self.ctx.dispatch_end_capture();
    }

    pub fn end_call(&self) {
        self.ctx.end_call();
    }

    pub fn set_muted(&self, muted: bool) {
        self.ctx.set_muted(muted);
    }

    // ─── Events & config ─────────────────────────────────────

    /// Drain pending events as a JSON array. The page calls this each
    /// frame instead of polling any state.
    pub fn drain_events(&self) -> String {
        self.ctx.drain_events_json()
    }

    pub fn has_pending_events(&self) -> bool {
        self.ctx.has_pending_events()
    }

    pub fn config(&self) -> String {
        self.ctx.config_json()
    }

    pub fn update_config(&self, json: String) {
        self.ctx.update_config_json(&json);
    }
}
