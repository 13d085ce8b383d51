use std::sync::Arc;

use tracing::{debug, error};

use crate::application::DocumentApi;
use crate::domain::{Notice, RemoteFile};

/// Returned in place of model output when generation fails.
pub const FALLBACK_RESPONSE: &str = "Failed to get response from Gemini.";

/// The text to show for one chat turn, plus the error notice when the text is
/// the fallback.
#[derive(Debug, Clone)]
pub struct Answer {
    text: String,
    error: Option<Notice>,
}

impl Answer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&Notice> {
        self.error.as_ref()
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_parts(self) -> (String, Option<Notice>) {
        (self.text, self.error)
    }
}

/// Use case for asking the model a question about an uploaded document.
pub struct AskDocumentUseCase {
    api: Arc<dyn DocumentApi>,
}

impl AskDocumentUseCase {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self { api }
    }

    /// Never fails: generation errors become [`FALLBACK_RESPONSE`].
    pub async fn execute(&self, file: &RemoteFile, prompt: &str) -> Answer {
        debug!(
            "Generating with {} for {} ({} chars of prompt)",
            self.api.model(),
            file.name(),
            prompt.len()
        );

        match self.api.generate(file, prompt).await {
            Ok(text) => Answer { text, error: None },
            Err(e) => {
                error!("Error during content generation: {}", e);
                Answer {
                    text: FALLBACK_RESPONSE.to_string(),
                    error: Some(Notice::error(format!(
                        "Error during content generation: {}",
                        e.detail()
                    ))),
                }
            }
        }
    }
}
