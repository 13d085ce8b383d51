use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{ClientFactory, ContentGenerator, DocumentApi, FileStorage};
use crate::domain::{DomainError, RemoteFile, RemoteFileState};

pub const MOCK_MODEL: &str = "mock-model";

/// A remote call observed by [`MockDocumentApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Upload {
        display_name: String,
        staged_path: PathBuf,
        size: usize,
    },
    Generate {
        file_name: String,
        prompt: String,
    },
    Delete {
        file_name: String,
    },
}

#[derive(Default)]
struct MockState {
    calls: Vec<MockCall>,
    live_files: HashSet<String>,
    next_id: u64,
}

/// In-process stand-in for the remote API.
///
/// Keeps a set of live files so deleting an unknown or already deleted file
/// fails the way the real service does, records every call, and can be told
/// to fail any endpoint.
pub struct MockDocumentApi {
    state: Mutex<MockState>,
    fail_uploads: bool,
    fail_generation: bool,
    fail_deletes: bool,
}

impl MockDocumentApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            fail_uploads: false,
            fail_generation: false,
            fail_deletes: false,
        }
    }

    pub fn with_failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn with_failing_generation(mut self) -> Self {
        self.fail_generation = true;
        self
    }

    pub fn with_failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn live_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.state.lock().await.live_files.iter().cloned().collect();
        files.sort();
        files
    }

    /// Deterministic model output for a prompt about a file.
    pub fn answer_for(display_name: &str, prompt: &str) -> String {
        format!("[{}] {} -> {}", MOCK_MODEL, display_name, prompt)
    }
}

impl Default for MockDocumentApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStorage for MockDocumentApi {
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, DomainError> {
        let size = tokio::fs::read(path).await?.len();

        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Upload {
            display_name: display_name.to_string(),
            staged_path: path.to_path_buf(),
            size,
        });

        if self.fail_uploads {
            return Err(DomainError::upload("mock upload failure"));
        }

        state.next_id += 1;
        let name = format!("files/mock-{}", state.next_id);
        state.live_files.insert(name.clone());

        debug!("Mock uploaded {} as {}", display_name, name);

        Ok(RemoteFile::new(
            name.clone(),
            format!("mock://{}", name),
            display_name,
            mime_type,
            RemoteFileState::Active,
        ))
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Delete {
            file_name: name.to_string(),
        });

        if self.fail_deletes {
            return Err(DomainError::deletion("mock delete failure"));
        }

        if !state.live_files.remove(name) {
            return Err(DomainError::deletion(format!(
                "404 Not Found: file {} does not exist",
                name
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for MockDocumentApi {
    async fn generate(&self, file: &RemoteFile, prompt: &str) -> Result<String, DomainError> {
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Generate {
            file_name: file.name().to_string(),
            prompt: prompt.to_string(),
        });

        if self.fail_generation {
            return Err(DomainError::generation("mock generation failure"));
        }

        if !state.live_files.contains(file.name()) {
            return Err(DomainError::generation(format!(
                "403 Forbidden: file {} is not accessible",
                file.name()
            )));
        }

        Ok(Self::answer_for(file.display_name(), prompt))
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}

/// Hands out one shared [`MockDocumentApi`] regardless of the key.
pub struct MockClientFactory {
    api: Arc<MockDocumentApi>,
}

impl MockClientFactory {
    pub fn new(api: Arc<MockDocumentApi>) -> Self {
        Self { api }
    }
}

impl Default for MockClientFactory {
    fn default() -> Self {
        Self::new(Arc::new(MockDocumentApi::new()))
    }
}

impl ClientFactory for MockClientFactory {
    fn create(&self, _api_key: &str) -> Result<Arc<dyn DocumentApi>, DomainError> {
        let api: Arc<dyn DocumentApi> = self.api.clone();
        Ok(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str) -> RemoteFile {
        RemoteFile::new(name, "mock://x", "doc.txt", "text/plain", RemoteFileState::Active)
    }

    #[tokio::test]
    async fn deleting_twice_fails_the_second_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"hello").unwrap();

        let api = MockDocumentApi::new();
        let file = api.upload_file(&path, "doc.txt", "text/plain").await.unwrap();

        assert!(api.delete_file(file.name()).await.is_ok());
        assert!(api.delete_file(file.name()).await.is_err());
        assert!(api.live_files().await.is_empty());
    }

    #[tokio::test]
    async fn generation_requires_a_live_file() {
        let api = MockDocumentApi::new();
        let err = api.generate(&remote("files/ghost"), "hi").await.unwrap_err();
        assert!(matches!(err, DomainError::GenerationError(_)));
    }
}
