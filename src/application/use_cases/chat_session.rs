use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::DocumentApi;
use crate::domain::{ActiveDocument, ChatMessage, DocumentUpload, Notice, Session};

use super::{AskDocumentUseCase, DeleteDocumentUseCase, UploadDocumentUseCase};

pub const NO_DOCUMENT_MESSAGE: &str = "Upload a document in the sidebar to begin chatting.";

/// Drives one [`Session`] through upload, chat and cleanup.
///
/// Every method reports remote failures as notices and leaves the session in a
/// consistent state; nothing here returns an error.
pub struct ChatSessionUseCase {
    upload: UploadDocumentUseCase,
    ask: AskDocumentUseCase,
    delete: DeleteDocumentUseCase,
}

impl ChatSessionUseCase {
    pub fn new(api: Arc<dyn DocumentApi>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload: UploadDocumentUseCase::new(Arc::clone(&api), upload_dir),
            ask: AskDocumentUseCase::new(Arc::clone(&api)),
            delete: DeleteDocumentUseCase::new(api),
        }
    }

    /// "Process Document": replace the active document with `document`.
    ///
    /// Identical bytes keep the current handle. Otherwise the previous handle
    /// is deleted before the new upload starts.
    pub async fn process_document(
        &self,
        session: &mut Session,
        document: DocumentUpload,
    ) -> Vec<Notice> {
        let mut notices = Vec::new();

        if let Some(active) = session.document() {
            if active.content_hash() == document.content_hash() {
                info!(
                    "{} matches the active document, reusing {}",
                    document.file_name(),
                    active.remote().name()
                );
                let active = active.clone();
                notices.push(Notice::info(format!(
                    "{} is already uploaded as {}.",
                    document.file_name(),
                    active.remote().name()
                )));
                session.start_document(active);
                return notices;
            }
        }

        if let Some(previous) = session.take_document() {
            notices.push(self.delete.execute(previous.remote()).await);
        }

        match self.upload.execute(&document).await {
            Ok(remote) => {
                notices.push(Notice::success(format!(
                    "File uploaded successfully! Name: {}",
                    remote.name()
                )));
                session.start_document(ActiveDocument::new(remote, document.content_hash()));
            }
            Err(e) => {
                notices.push(Notice::error(format!(
                    "Error during file upload: {}",
                    e.detail()
                )));
                session.clear();
            }
        }

        notices
    }

    /// One chat turn. Blank prompts are ignored.
    pub async fn chat(&self, session: &mut Session, prompt: &str) -> Vec<Notice> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!("Ignoring blank prompt");
            return Vec::new();
        }

        let Some(file) = session.remote_file().cloned() else {
            return vec![Notice::info(NO_DOCUMENT_MESSAGE)];
        };

        session.push_message(ChatMessage::user(prompt));

        let (text, error) = self.ask.execute(&file, prompt).await.into_parts();
        session.push_message(ChatMessage::assistant(text));

        error.into_iter().collect()
    }

    /// Manual "Delete File".
    pub async fn delete_document(&self, session: &mut Session) -> Vec<Notice> {
        if !session.can_delete() {
            return vec![Notice::info("There is no uploaded document to delete.")];
        }

        let mut notices = Vec::new();
        if let Some(active) = session.take_document() {
            notices.push(self.delete.execute(active.remote()).await);
        }
        session.mark_deleted();

        notices
    }
}
