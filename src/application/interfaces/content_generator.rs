use async_trait::async_trait;

use crate::domain::{DomainError, RemoteFile};

/// Remote generation endpoint bound to a single model.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Send `[file, prompt]` as one request and return the response text.
    async fn generate(&self, file: &RemoteFile, prompt: &str) -> Result<String, DomainError>;

    fn model(&self) -> &str;
}
