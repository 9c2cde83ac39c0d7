//! Conversation manager — owns the set of chat sessions, the active
//! session pointer, and message history.
//!
//! Every state-mutating operation persists through the session store
//! before returning and announces itself on the event bus, so the
//! presentation layer never polls.

use voxdoc_types::{
    document::Document,
    event::AppEvent,
    message::{Message, Role},
    session::{Session, SessionSummary},
    Result, VoxError,
};

use crate::event_bus::EventBus;
use crate::store::{PersistedState, SessionStore};

pub struct ConversationManager {
    /// Creation order is significant: it breaks activity-time ties
    sessions: Vec<Session>,
    active_id: Option<String>,
    counter: u64,
    store: SessionStore,
    events: EventBus,
}

impl ConversationManager {
    /// Restore persisted sessions, or start empty. An active pointer
    /// referring to a session that no longer exists is dropped to the
    /// most recently used session.
    pub async fn restore(store: SessionStore, events: EventBus) -> Self {
        let PersistedState {
            sessions,
            active_id,
            counter,
        } = store.load().await;

        let sessions: Vec<Session> = sessions.into_iter().map(|(_, s)| s).collect();
        let mut manager = Self {
            sessions,
            active_id: None,
            counter,
            store,
            events,
        };
        manager.active_id = match active_id {
            Some(id) if manager.find(&id).is_some() => Some(id),
            _ => manager.most_recent_id(),
        };
        manager
    }

    // ─── Public operations ───────────────────────────────────

    /// Allocate a new empty session, make it active, persist, and
    /// return its id.
    pub async fn create_session(&mut self) -> String {
        self.counter += 1;
        let id = format!("session-{}", self.counter);
        let session = Session::new(&id);
        self.sessions.push(session.clone());
        self.active_id = Some(id.clone());
        self.events.emit(AppEvent::SessionCreated { id: id.clone() });
        self.events.emit(AppEvent::SessionChanged { session });
        self.persist().await;
        id
    }

    /// Switch the active pointer. Emits the full session for the
    /// consumer to render and refreshes the downstream document
    /// context.
    pub async fn set_active(&mut self, id: &str) -> Result<()> {
        let session = self
            .find(id)
            .cloned()
            .ok_or_else(|| VoxError::SessionNotFound(id.to_string()))?;
        self.active_id = Some(id.to_string());
        self.events.emit(AppEvent::SessionChanged { session });
        self.persist().await;
        Ok(())
    }

    /// Remove a session. Deleting the active one reactivates the
    /// remaining session with the latest activity (ties to the newest
    /// created), or clears to the explicit empty state.
    pub async fn delete_session(&mut self, id: &str) -> Result<()> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| VoxError::SessionNotFound(id.to_string()))?;
        self.sessions.remove(index);
        self.events.emit(AppEvent::SessionDeleted { id: id.to_string() });

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.most_recent_id();
            match self.active() {
                Some(session) => {
                    let session = session.clone();
                    self.events.emit(AppEvent::SessionChanged { session });
                }
                None => self.events.emit(AppEvent::ActiveCleared),
            }
        }
        self.persist().await;
        Ok(())
    }

    /// Append one turn to the active session. Calling this with no
    /// active session is a caller-contract violation and a logged
    /// no-op, not a user-facing error.
    pub async fn append_message(
        &mut self,
        role: Role,
        content: &str,
        audio_ref: Option<String>,
    ) -> Option<Message> {
        let Some(session) = self.active_mut() else {
            log::warn!("append_message with no active session; dropping turn");
            return None;
        };
        let mut message = Message::new(role, content);
        message.audio_ref = audio_ref;
        session.append(message.clone());
        let session_id = session.id.clone();
        self.events.emit(AppEvent::MessageAppended {
            session_id,
            message: message.clone(),
        });
        self.persist().await;
        Some(message)
    }

    /// Bind a document to the active session and derive its subtitle.
    pub async fn bind_document(&mut self, document: Document) -> Result<()> {
        let Some(session) = self.active_mut() else {
            return Err(VoxError::NoActiveSession);
        };
        session.bind(document.clone());
        let session_id = session.id.clone();
        self.events.emit(AppEvent::DocumentBound {
            session_id,
            document,
        });
        self.persist().await;
        Ok(())
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn active(&self) -> Option<&Session> {
        let id = self.active_id.as_deref()?;
        self.find(id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Document context consumed by the synthesis gateway and the
    /// upload pipeline; follows the active session.
    pub fn active_document_id(&self) -> Option<String> {
        self.active()?.document_id().map(str::to_string)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::from).collect()
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    // ─── Internals ───────────────────────────────────────────

    fn find(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn active_mut(&mut self) -> Option<&mut Session> {
        let id = self.active_id.clone()?;
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Latest `last_activity_at`; ties broken by newest creation order.
    fn most_recent_id(&self) -> Option<String> {
        self.sessions
            .iter()
            .enumerate()
            .max_by_key(|(index, s)| (s.last_activity_at, *index))
            .map(|(_, s)| s.id.clone())
    }

    async fn persist(&self) {
        let state = PersistedState {
            sessions: self
                .sessions
                .iter()
                .map(|s| (s.id.clone(), s.clone()))
                .collect(),
            active_id: self.active_id.clone(),
            counter: self.counter,
        };
        self.store.save(&state).await;
    }
}
