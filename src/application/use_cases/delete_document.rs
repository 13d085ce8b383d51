use std::sync::Arc;

use tracing::{info, warn};

use crate::application::DocumentApi;
use crate::domain::{Notice, RemoteFile};

/// Use case for removing an uploaded document from remote storage.
pub struct DeleteDocumentUseCase {
    api: Arc<dyn DocumentApi>,
}

impl DeleteDocumentUseCase {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self { api }
    }

    /// Best effort: a failure, including deleting a file that is already
    /// gone, comes back as a warning notice.
    pub async fn execute(&self, file: &RemoteFile) -> Notice {
        match self.api.delete_file(file.name()).await {
            Ok(()) => {
                info!("Deleted remote file {}", file.name());
                Notice::success(format!("Clean up complete. File {} deleted.", file.name()))
            }
            Err(e) => {
                warn!("Failed to delete file {}: {}", file.name(), e);
                Notice::warning(format!(
                    "Failed to delete file {}. Error: {}",
                    file.name(),
                    e.detail()
                ))
            }
        }
    }
}
