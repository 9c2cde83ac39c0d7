//! Text-chat orchestration: one linear async turn per user message.
//!
//! send_message walks append-user → remote answer → optional voice
//! rendition → append-assistant, converting every collaborator failure
//! into a notice at the boundary. attach_document validates locally,
//! uploads, and binds the result to the active session.

use std::rc::Rc;

use voxdoc_types::{
    config::VoiceConfig,
    document::Document,
    event::{AppEvent, NoticeLevel},
    message::{Message, Role},
};

use crate::conversation::ConversationManager;
use crate::event_bus::EventBus;
use crate::gateway::{SynthesisOutcome, VoiceGateway};
use crate::ports::{AnswerPort, DocumentPort, LocalSpeechPort};

/// Upload bound enforced locally before any bytes cross the network
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Recent messages sent along as answer context
const HISTORY_WINDOW: usize = 10;

pub struct ChatService {
    conversation: ConversationManager,
    documents: Rc<dyn DocumentPort>,
    answers: Rc<dyn AnswerPort>,
    gateway: Rc<VoiceGateway>,
    local_speech: Rc<dyn LocalSpeechPort>,
    voice: VoiceConfig,
    events: EventBus,
}

impl ChatService {
    pub fn new(
        conversation: ConversationManager,
        documents: Rc<dyn DocumentPort>,
        answers: Rc<dyn AnswerPort>,
        gateway: Rc<VoiceGateway>,
        local_speech: Rc<dyn LocalSpeechPort>,
        voice: VoiceConfig,
        events: EventBus,
    ) -> Self {
        Self {
            conversation,
            documents,
            answers,
            gateway,
            local_speech,
            voice,
            events,
        }
    }

    /// One chat turn. Returns the assistant message on success so the
    /// caller can auto-play its audio rendition; every failure short of
    /// a programming error surfaces as a notice instead.
    pub async fn send_message(&mut self, text: &str) -> Option<Message> {
        let text = text.trim().to_string();
        if text.is_empty() {
            self.notice(NoticeLevel::Warning, "Type a question first.");
            return None;
        }
        if self.conversation.active().is_none() {
            self.conversation.create_session().await;
        }

        // Context is captured before the new turn so the question is
        // not doubled into its own history
        let history: Vec<Message> = self
            .conversation
            .active()
            .map(|s| {
                let skip = s.messages.len().saturating_sub(HISTORY_WINDOW);
                s.messages[skip..].to_vec()
            })
            .unwrap_or_default();
        let file_id = self.conversation.active_document_id();

        self.conversation
            .append_message(Role::User, &text, None)
            .await;

        let response = match self
            .answers
            .chat(&text, file_id.as_deref(), &self.voice.language, &history)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.notice(NoticeLevel::Error, format!("Could not get an answer: {}", e));
                return None;
            }
        };

        let audio_ref = if self.voice.speak_replies && !response.trim().is_empty() {
            self.render_voice(&response).await
        } else {
            None
        };

        self.conversation
            .append_message(Role::Assistant, &response, audio_ref)
            .await
    }

    /// Validate, upload, and bind a document to the active session.
    pub async fn attach_document(&mut self, bytes: &[u8], filename: &str) -> Option<Document> {
        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            self.notice(NoticeLevel::Warning, "Only PDF files are supported.");
            return None;
        }
        if bytes.is_empty() {
            self.notice(NoticeLevel::Warning, "The selected file is empty.");
            return None;
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            self.notice(NoticeLevel::Warning, "PDFs over 10 MB are not supported.");
            return None;
        }
        if self.conversation.active().is_none() {
            self.conversation.create_session().await;
        }

        let document = match self.documents.upload(bytes, filename).await {
            Ok(document) => document,
            Err(e) => {
                self.notice(NoticeLevel::Error, format!("Upload failed: {}", e));
                return None;
            }
        };

        match self.conversation.bind_document(document.clone()).await {
            Ok(()) => {
                self.notice(
                    NoticeLevel::Info,
                    format!("{} is ready. Ask away.", document.filename),
                );
                Some(document)
            }
            Err(e) => {
                log::error!("Document bind failed after upload: {}", e);
                None
            }
        }
    }

    pub fn set_voice_config(&mut self, voice: VoiceConfig) {
        self.voice = voice;
    }

    pub fn conversation(&self) -> &ConversationManager {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationManager {
        &mut self.conversation
    }

    // ─── Internals ───────────────────────────────────────────

    /// Try the remote provider; on a "no audio" outcome fall through to
    /// the local alternate path and store the message text-only.
    async fn render_voice(&self, text: &str) -> Option<String> {
        let mut voice = self.gateway.resolve_voice(&self.voice.language).await;
        if let Some(pinned) = &self.voice.voice_id {
            voice.voice_id = pinned.clone();
            voice.cross_language_fallback = false;
        }

        match self.gateway.synthesize(text, &voice, self.voice.speed).await {
            Ok(SynthesisOutcome::Audio { audio_ref }) => Some(audio_ref),
            Ok(SynthesisOutcome::Unavailable { reason }) => {
                log::warn!("Falling back to local speech: {}", reason);
                if self
                    .local_speech
                    .speak(text, &self.voice.language, Some(&voice.voice_id))
                    .is_err()
                {
                    self.notice(
                        NoticeLevel::Warning,
                        "Voice reply unavailable; showing text only.",
                    );
                }
                None
            }
            Err(e) => {
                log::error!("Synthesis rejected: {}", e);
                None
            }
        }
    }

    fn notice(&self, level: NoticeLevel, text: impl Into<String>) {
        self.events.emit(AppEvent::Notice {
            level,
            text: text.into(),
        });
    }
}
