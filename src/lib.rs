pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    AskDocumentUseCase, ChatSessionUseCase, ClientFactory, ClientInitializer, ContentGenerator,
    DeleteDocumentUseCase, DocumentApi, FileStorage, SecretStore, UploadDocumentUseCase,
    API_KEY_NAME, FALLBACK_RESPONSE,
};

pub use cli::Commands;

pub use connector::{
    build_router, AppState, Container, ContainerConfig, EnvSecretStore, GeminiClient,
    GeminiClientFactory, InMemorySecretStore, LayeredSecretStore, MockCall, MockClientFactory,
    MockDocumentApi, TomlSecretStore,
};

pub use domain::{
    ActiveDocument, ChatMessage, DocumentKind, DocumentUpload, DomainError, Notice, NoticeLevel,
    RemoteFile, RemoteFileState, Role, Session, SessionPhase, ACCEPTED_EXTENSIONS, GREETING,
};
