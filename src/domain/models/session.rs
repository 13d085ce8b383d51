use serde::{Deserialize, Serialize};

use super::{ChatMessage, RemoteFile};

/// First assistant message shown once a document is ready.
pub const GREETING: &str = "Document analysis ready! Ask me any question about the content.";

/// The remote handle currently backing a session, with the hash of the bytes
/// it was uploaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    remote: RemoteFile,
    content_hash: String,
}

impl ActiveDocument {
    pub fn new(remote: RemoteFile, content_hash: impl Into<String>) -> Self {
        Self {
            remote,
            content_hash: content_hash.into(),
        }
    }

    pub fn remote(&self) -> &RemoteFile {
        &self.remote
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoDocument,
    Ready,
    Chatting,
    Deleted,
}

/// Per-browser state: at most one remote document, the chat history and
/// whether manual cleanup has run.
#[derive(Debug, Clone, Default)]
pub struct Session {
    document: Option<ActiveDocument>,
    messages: Vec<ChatMessage>,
    cleanup_done: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&ActiveDocument> {
        self.document.as_ref()
    }

    pub fn remote_file(&self) -> Option<&RemoteFile> {
        self.document.as_ref().map(ActiveDocument::remote)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn cleanup_done(&self) -> bool {
        self.cleanup_done
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.document, self.cleanup_done) {
            (None, true) => SessionPhase::Deleted,
            (None, false) => SessionPhase::NoDocument,
            (Some(_), _) if self.messages.len() <= 1 => SessionPhase::Ready,
            (Some(_), _) => SessionPhase::Chatting,
        }
    }

    /// Manual deletion is offered only while a document is held and cleanup
    /// has not run yet.
    pub fn can_delete(&self) -> bool {
        self.document.is_some() && !self.cleanup_done
    }

    /// Installs a freshly uploaded document and resets the conversation.
    pub fn start_document(&mut self, document: ActiveDocument) {
        self.document = Some(document);
        self.messages = vec![ChatMessage::assistant(GREETING)];
        self.cleanup_done = false;
    }

    /// Removes the active document, leaving history untouched.
    pub fn take_document(&mut self) -> Option<ActiveDocument> {
        self.document.take()
    }

    /// State after an upload that did not complete: nothing held, no history.
    pub fn clear(&mut self) {
        self.document = None;
        self.messages.clear();
        self.cleanup_done = false;
    }

    /// State after a manual delete.
    pub fn mark_deleted(&mut self) {
        self.clear();
        self.cleanup_done = true;
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}
