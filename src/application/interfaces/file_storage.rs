use std::path::Path;

use async_trait::async_trait;

use crate::domain::{DomainError, RemoteFile};

/// Remote file-storage endpoint.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Upload a local file and return the handle the service assigned to it.
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, DomainError>;

    /// Delete a previously uploaded file by its remote name (`files/...`).
    async fn delete_file(&self, name: &str) -> Result<(), DomainError>;
}
