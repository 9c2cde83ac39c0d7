use serde::{Deserialize, Serialize};

/// Metadata for a document bound to a session.
///
/// Produced once per successful upload by the extraction collaborator and
/// owned exclusively by the session it is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier assigned by the extraction service
    pub file_id: String,
    pub filename: String,
    /// Length of the extracted text, in characters
    pub extracted_length: usize,
    pub summary: String,
}

impl Document {
    /// Short display label used as the session subtitle.
    pub fn display_label(&self) -> String {
        format!("{} ({} chars)", self.filename, self.extracted_length)
    }
}
