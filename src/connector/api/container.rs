use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::{
    AskDocumentUseCase, ChatSessionUseCase, ClientFactory, ClientInitializer,
    DeleteDocumentUseCase, DocumentApi, SecretStore, UploadDocumentUseCase, API_KEY_NAME,
};
use crate::connector::adapter::{
    GeminiClientFactory, InMemorySecretStore, LayeredSecretStore, MockClientFactory,
};
use crate::domain::DomainError;

pub struct ContainerConfig {
    /// TOML secrets file consulted after the environment.
    pub secrets_path: PathBuf,
    /// Where uploads are staged before being sent.
    pub upload_dir: PathBuf,
    /// Use the in-process mock instead of the hosted API.
    pub mock_api: bool,
}

impl ContainerConfig {
    pub fn default_upload_dir() -> PathBuf {
        std::env::temp_dir().join("docchat_uploads")
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            secrets_path: PathBuf::from("secrets.toml"),
            upload_dir: Self::default_upload_dir(),
            mock_api: false,
        }
    }
}

/// Process-wide services, built once at startup and shared by every request.
pub struct Container {
    initializer: ClientInitializer,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        let (secrets, factory): (Arc<dyn SecretStore>, Arc<dyn ClientFactory>) = if config.mock_api
        {
            debug!("Using mock document API");
            (
                Arc::new(InMemorySecretStore::new().with(API_KEY_NAME, "mock-api-key")),
                Arc::new(MockClientFactory::default()),
            )
        } else {
            let factory = GeminiClientFactory::from_env();
            debug!(
                "Using Gemini API (model {}), secrets from env and {}",
                factory.model(),
                config.secrets_path.display()
            );
            (
                Arc::new(LayeredSecretStore::env_then_file(&config.secrets_path)),
                Arc::new(factory),
            )
        };

        Self::with_initializer(ClientInitializer::new(secrets, factory), config)
    }

    pub fn with_initializer(initializer: ClientInitializer, config: ContainerConfig) -> Self {
        Self {
            initializer,
            config,
        }
    }

    /// The cached client handle.
    pub fn client(&self) -> Result<Arc<dyn DocumentApi>, DomainError> {
        self.initializer.client()
    }

    pub fn client_error(&self) -> Option<String> {
        self.initializer.client_or_message().1
    }

    pub fn chat_session_use_case(&self) -> Result<ChatSessionUseCase, DomainError> {
        Ok(ChatSessionUseCase::new(
            self.client()?,
            self.config.upload_dir.clone(),
        ))
    }

    pub fn upload_use_case(&self) -> Result<UploadDocumentUseCase, DomainError> {
        Ok(UploadDocumentUseCase::new(
            self.client()?,
            self.config.upload_dir.clone(),
        ))
    }

    pub fn ask_use_case(&self) -> Result<AskDocumentUseCase, DomainError> {
        Ok(AskDocumentUseCase::new(self.client()?))
    }

    pub fn delete_use_case(&self) -> Result<DeleteDocumentUseCase, DomainError> {
        Ok(DeleteDocumentUseCase::new(self.client()?))
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        &self.config.upload_dir
    }

    pub fn mock_api(&self) -> bool {
        self.config.mock_api
    }
}
