use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::DocumentApi;
use crate::domain::{DocumentUpload, DomainError, RemoteFile};

use super::transient_file::TransientFile;

/// Use case for forwarding an in-memory document to the remote file store.
pub struct UploadDocumentUseCase {
    api: Arc<dyn DocumentApi>,
    upload_dir: PathBuf,
}

impl UploadDocumentUseCase {
    pub fn new(api: Arc<dyn DocumentApi>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            upload_dir: upload_dir.into(),
        }
    }

    /// Stage the blob locally, upload it, and return the remote handle.
    ///
    /// The staged copy is removed when this returns, whether the remote call
    /// succeeded, failed or the future was dropped mid-flight.
    pub async fn execute(&self, document: &DocumentUpload) -> Result<RemoteFile, DomainError> {
        let staged = TransientFile::create(
            &self.upload_dir,
            document.file_name(),
            document.bytes(),
        )
        .map_err(|e| {
            DomainError::upload(format!(
                "Could not stage {} for upload: {}",
                document.file_name(),
                e
            ))
        })?;

        info!(
            "Uploading file: {} ({} bytes)",
            document.file_name(),
            document.bytes().len()
        );

        let result = self
            .api
            .upload_file(staged.path(), document.file_name(), &document.mime_type())
            .await;

        match result {
            Ok(remote) => {
                info!("File uploaded successfully: {}", remote.name());
                Ok(remote)
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", document.file_name(), e);
                Err(match e {
                    DomainError::UploadError(_) => e,
                    other => DomainError::upload(other.detail()),
                })
            }
        }
    }
}
