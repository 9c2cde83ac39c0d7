use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::message::{Message, Role};

/// Placeholder title until the first user message arrives
pub const UNTITLED: &str = "New conversation";

/// Maximum characters of the first user message used for the title
const TITLE_MAX_CHARS: usize = 40;

/// A persisted conversation thread, bound to zero or one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document: Option<Document>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: UNTITLED.to_string(),
            subtitle: String::new(),
            messages: Vec::new(),
            document: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Append a message, refresh the activity timestamp, and derive the
    /// title from the first user message. Messages are never mutated or
    /// reordered after this point.
    pub fn append(&mut self, message: Message) {
        if self.title == UNTITLED && message.role == Role::User {
            self.title = derive_title(&message.content);
        }
        self.last_activity_at = message.timestamp;
        self.messages.push(message);
    }

    /// Bind a document and derive the subtitle from its metadata.
    /// A session's document is immutable once set.
    pub fn bind(&mut self, document: Document) {
        self.subtitle = document.display_label();
        self.document = Some(document);
        self.last_activity_at = Utc::now();
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.file_id.as_str())
    }
}

fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        title.push('…');
    }
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Summary of a session for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub last_activity_at: DateTime<Utc>,
    pub message_count: usize,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            subtitle: s.subtitle.clone(),
            last_activity_at: s.last_activity_at,
            message_count: s.messages.len(),
        }
    }
}
