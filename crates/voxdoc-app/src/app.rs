//! Application context — every service constructed once at startup
//! and shared by reference, never through ambient globals.

use std::cell::{Cell, RefCell};
use std::pin::Pin;
use std::rc::Rc;

use futures::Stream;
use wasm_bindgen_futures::spawn_local;

use voxdoc_core::call::CallController;
use voxdoc_core::chat::ChatService;
use voxdoc_core::conversation::ConversationManager;
use voxdoc_core::event_bus::EventBus;
use voxdoc_core::gateway::VoiceGateway;
use voxdoc_core::playback::AudioPlayback;
use voxdoc_core::ports::{AudioSinkPort, SinkEvent, StoragePort};
use voxdoc_core::store::SessionStore;
use voxdoc_platform::api::ApiClient;
use voxdoc_platform::audio::{HtmlAudioSink, MediaRecorderCapture};
use voxdoc_platform::speech::WebSpeech;
use voxdoc_platform::storage::detect_storage;
use voxdoc_platform::timer::GlooTimer;
use voxdoc_types::audio::{PlaybackErrorKind, PlaybackState};
use voxdoc_types::config::{AppConfig, StorageBackendType};
use voxdoc_types::event::{AppEvent, NoticeLevel};

const CONFIG_STORAGE_KEY: &str = "voxdoc:config";

pub struct AppContext {
    config: RefCell<AppConfig>,
    events: EventBus,
    storage: Rc<dyn StoragePort>,
    chat: Rc<RefCell<ChatService>>,
    call: Rc<CallController>,
    playback: Rc<AudioPlayback>,
    gateway: Rc<VoiceGateway>,
    /// Chat dispatches are serialized; overlapping sends would reorder
    /// message appends
    busy: Rc<Cell<bool>>,
}

impl AppContext {
    pub async fn boot() -> Rc<Self> {
        let events = EventBus::new();

        // Config lives in the same slot family as the sessions, so the
        // bootstrap backend is Auto and may be re-picked once the
        // stored preference is known
        let mut storage = detect_storage(StorageBackendType::Auto);
        let config = Self::restore_config(&storage).await;
        if config.storage.backend != StorageBackendType::Auto {
            storage = detect_storage(config.storage.backend);
        }

        let api = Rc::new(ApiClient::new(config.api.base_url.clone()));
        let gateway = Rc::new(VoiceGateway::new(api.clone(), api.clone()));

        let sink: Rc<dyn AudioSinkPort> = match HtmlAudioSink::new() {
            Ok(sink) => Rc::new(sink),
            Err(e) => {
                log::warn!("Audio element unavailable: {}. Using silent sink.", e);
                Rc::new(SilentSink)
            }
        };
        let playback = Rc::new(AudioPlayback::new(sink));

        let conversation =
            ConversationManager::restore(SessionStore::new(storage.clone()), events.clone()).await;
        let chat = ChatService::new(
            conversation,
            api.clone(),
            api.clone(),
            gateway.clone(),
            Rc::new(WebSpeech::new()),
            config.voice.clone(),
            events.clone(),
        );
        let call = CallController::new(
            Rc::new(MediaRecorderCapture::new()),
            api,
            playback.clone(),
            Rc::new(GlooTimer::new()),
            events.clone(),
        );

        log::info!("VoxDoc services ready");
        Rc::new(Self {
            config: RefCell::new(config),
            events,
            storage,
            chat: Rc::new(RefCell::new(chat)),
            call: Rc::new(call),
            playback,
            gateway,
            busy: Rc::new(Cell::new(false)),
        })
    }

    // ─── Chat dispatches ─────────────────────────────────────

    /// Run one chat turn, then auto-play the reply's rendition.
    pub fn dispatch_send(self: &Rc<Self>, text: String) {
        if self.claim_busy().is_none() {
            return;
        }
        let ctx = self.clone();
        spawn_local(async move {
            let reply = ctx.chat.borrow_mut().send_message(&text).await;
            ctx.busy.set(false);
            if let Some(audio_ref) = reply.and_then(|m| m.audio_ref) {
                ctx.play_audio(audio_ref);
            }
        });
    }

    pub fn dispatch_attach_document(self: &Rc<Self>, bytes: Vec<u8>, filename: String) {
        if self.claim_busy().is_none() {
            return;
        }
        let ctx = self.clone();
        spawn_local(async move {
            let _ = ctx.chat.borrow_mut().attach_document(&bytes, &filename).await;
            ctx.busy.set(false);
        });
    }

    // ─── Session dispatches ──────────────────────────────────

    pub fn dispatch_new_session(self: &Rc<Self>) {
        if self.claim_busy().is_none() {
            return;
        }
        let ctx = self.clone();
        spawn_local(async move {
            ctx.chat.borrow_mut().conversation_mut().create_session().await;
            ctx.busy.set(false);
        });
    }

    pub fn dispatch_set_active(self: &Rc<Self>, id: String) {
        if self.claim_busy().is_none() {
            return;
        }
        let ctx = self.clone();
        spawn_local(async move {
            let result = ctx
                .chat
                .borrow_mut()
                .conversation_mut()
                .set_active(&id)
                .await;
            ctx.busy.set(false);
            if let Err(e) = result {
                ctx.notice(NoticeLevel::Warning, e.to_string());
            }
        });
    }

    pub fn dispatch_delete_session(self: &Rc<Self>, id: String) {
        if self.claim_busy().is_none() {
            return;
        }
        let ctx = self.clone();
        spawn_local(async move {
            let result = ctx
                .chat
                .borrow_mut()
                .conversation_mut()
                .delete_session(&id)
                .await;
            ctx.busy.set(false);
            if let Err(e) = result {
                ctx.notice(NoticeLevel::Warning, e.to_string());
            }
        });
    }

    // ─── Playback ────────────────────────────────────────────

    /// Play one message's rendition; the page keeps its per-message
    /// button in sync from PlaybackChanged events.
    pub fn play_audio(self: &Rc<Self>, audio_ref: String) {
        let ctx = self.clone();
        spawn_local(async move {
            let events = ctx.events.clone();
            let observed = audio_ref.clone();
            ctx.playback
                .play(
                    &audio_ref,
                    Rc::new(move |state| {
                        if let PlaybackState::Errored(kind) = state {
                            events.emit(AppEvent::Notice {
                                level: NoticeLevel::Warning,
                                text: kind.user_message().to_string(),
                            });
                        }
                        events.emit(AppEvent::PlaybackChanged {
                            audio_ref: observed.clone(),
                            state,
                        });
                    }),
                )
                .await;
        });
    }

    pub fn stop_audio(&self) {
        self.playback.stop();
    }

    // ─── Call ────────────────────────────────────────────────

    /// Start a hands-free call on the active session's document.
    pub fn dispatch_start_call(self: &Rc<Self>) {
        let document_id = self.chat.borrow().conversation().active_document_id();
        let (language, pinned_voice) = {
            let config = self.config.borrow();
            (config.voice.language.clone(), config.voice.voice_id.clone())
        };
        let ctx = self.clone();
        spawn_local(async move {
            let voice_id = match pinned_voice {
                Some(voice_id) => voice_id,
                None => ctx.gateway.resolve_voice(&language).await.voice_id,
            };
            if let Err(e) = ctx
                .call
                .start_call(document_id.as_deref(), &language, &voice_id)
            {
                ctx.notice(NoticeLevel::Warning, e.to_string());
            }
        });
    }

    pub fn dispatch_begin_capture(self: &Rc<Self>) {
        let ctx = self.clone();
        spawn_local(async move {
            ctx.call.begin_capture().await;
        });
    }

    pub fn dispatch_end_capture(self: &Rc<Self>) {
        let ctx = self.clone();
        spawn_local(async move {
            ctx.call.end_capture().await;
        });
    }

    pub fn end_call(&self) {
        self.call.end_call();
    }

    pub fn set_muted(&self, muted: bool) {
        self.call.set_muted(muted);
    }

    // ─── Events & config ─────────────────────────────────────

    pub fn drain_events_json(&self) -> String {
        serde_json::to_string(&self.events.drain()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn has_pending_events(&self) -> bool {
        self.events.has_pending()
    }

    pub fn sessions_json(&self) -> String {
        // try_borrow: a chat turn may hold the service across its await
        match self.chat.try_borrow() {
            Ok(chat) => serde_json::to_string(&chat.conversation().summaries())
                .unwrap_or_else(|_| "[]".to_string()),
            Err(_) => "[]".to_string(),
        }
    }

    pub fn active_session_json(&self) -> String {
        match self.chat.try_borrow() {
            Ok(chat) => serde_json::to_string(&chat.conversation().active())
                .unwrap_or_else(|_| "null".to_string()),
            Err(_) => "null".to_string(),
        }
    }

    pub fn config_json(&self) -> String {
        serde_json::to_string(&*self.config.borrow()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply and persist a config change. Voice settings take effect
    /// immediately; the API base is read again at the next boot.
    pub fn update_config_json(self: &Rc<Self>, json: &str) {
        let parsed: AppConfig = match serde_json::from_str(json) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.notice(NoticeLevel::Warning, format!("Invalid settings: {}", e));
                return;
            }
        };
        match self.chat.try_borrow_mut() {
            Ok(mut chat) => chat.set_voice_config(parsed.voice.clone()),
            Err(_) => {
                self.notice(NoticeLevel::Info, "Still working on the previous request.");
                return;
            }
        }
        *self.config.borrow_mut() = parsed.clone();

        let storage = self.storage.clone();
        spawn_local(async move {
            if let Ok(blob) = serde_json::to_string(&parsed) {
                let _ = storage.set(CONFIG_STORAGE_KEY, &blob).await;
                log::info!("Config saved to storage");
            }
        });
    }

    // ─── Internals ───────────────────────────────────────────

    async fn restore_config(storage: &Rc<dyn StoragePort>) -> AppConfig {
        match storage.get(CONFIG_STORAGE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(config) => {
                    log::info!("Config restored from storage");
                    config
                }
                Err(e) => {
                    log::warn!("Discarding corrupt config blob: {}", e);
                    AppConfig::default()
                }
            },
            _ => AppConfig::default(),
        }
    }

    /// Claim the chat pipeline, or tell the user it is taken.
    fn claim_busy(&self) -> Option<()> {
        if self.busy.replace(true) {
            self.notice(NoticeLevel::Info, "Still working on the previous request.");
            return None;
        }
        Some(())
    }

    fn notice(&self, level: NoticeLevel, text: impl Into<String>) {
        self.events.emit(AppEvent::Notice {
            level,
            text: text.into(),
        });
    }
}

// ─── Silent sink for when no audio element exists ────────────

struct SilentSink;

impl AudioSinkPort for SilentSink {
    fn play(&self, _url: &str) -> Pin<Box<dyn Stream<Item = SinkEvent>>> {
        Box::pin(futures::stream::once(async {
            SinkEvent::Error(PlaybackErrorKind::FormatUnsupported)
        }))
    }

    fn stop(&self) {}

    fn is_playing(&self) -> bool {
        false
    }
}
