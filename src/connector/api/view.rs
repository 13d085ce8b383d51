use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, Notice, RemoteFile, Session, SessionPhase, ACCEPTED_EXTENSIONS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
}

impl From<&RemoteFile> for DocumentView {
    fn from(file: &RemoteFile) -> Self {
        Self {
            name: file.name().to_string(),
            display_name: file.display_name().to_string(),
            mime_type: file.mime_type().to_string(),
        }
    }
}

/// Everything the page needs to render one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub document: Option<DocumentView>,
    pub messages: Vec<ChatMessage>,
    pub cleanup_done: bool,
    pub can_delete: bool,
    pub client_error: Option<String>,
    pub accepted_extensions: Vec<String>,
}

impl SessionView {
    pub fn new(session: &Session, client_error: Option<String>) -> Self {
        Self {
            phase: session.phase(),
            document: session.remote_file().map(DocumentView::from),
            messages: session.messages().to_vec(),
            cleanup_done: session.cleanup_done(),
            can_delete: session.can_delete(),
            client_error,
            accepted_extensions: ACCEPTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Response to every action: the resulting session and what to tell the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub session: SessionView,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}
