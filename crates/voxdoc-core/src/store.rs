//! Session persistence: one JSON record in a process-local key-value
//! slot, holding every session, the active pointer, and the id counter.
//!
//! Corruption is never fatal: a blob that fails to parse is logged and
//! replaced by an empty state on the next save.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ports::StoragePort;
use voxdoc_types::session::Session;

/// Storage key for the serialized session state
pub const SESSIONS_KEY: &str = "voxdoc:sessions";

/// Everything the conversation manager needs to survive a reload.
/// Sessions are stored as `(id, Session)` pairs in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    pub sessions: Vec<(String, Session)>,
    pub active_id: Option<String>,
    /// Monotonic counter backing session id generation
    pub counter: u64,
}

pub struct SessionStore {
    storage: Rc<dyn StoragePort>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Restore the persisted state, or an empty one when nothing was
    /// saved yet or the blob is unreadable. Fails soft: corruption is
    /// logged, never surfaced.
    pub async fn load(&self) -> PersistedState {
        match self.storage.get(SESSIONS_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<PersistedState>(&blob) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!("Discarding corrupt session blob: {}", e);
                    PersistedState::default()
                }
            },
            Ok(None) => PersistedState::default(),
            Err(e) => {
                log::warn!(
                    "Session load failed on {} backend: {}",
                    self.storage.backend_name(),
                    e
                );
                PersistedState::default()
            }
        }
    }

    /// Persist the full state as a single write. Idempotent; failures
    /// are logged rather than propagated; losing a save must not take
    /// the conversation down with it.
    pub async fn save(&self, state: &PersistedState) {
        let blob = match serde_json::to_string(state) {
            Ok(blob) => blob,
            Err(e) => {
                log::error!("Session state failed to serialize: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(SESSIONS_KEY, &blob).await {
            log::warn!(
                "Session save failed on {} backend: {}",
                self.storage.backend_name(),
                e
            );
        }
    }
}
