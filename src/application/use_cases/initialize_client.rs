use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::application::{ClientFactory, DocumentApi, SecretStore};
use crate::domain::DomainError;

/// Name of the secret holding the API key.
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";

/// Values that are present but obviously not a real key.
const PLACEHOLDER_KEYS: [&str; 2] = ["", "YOUR_ACTUAL_API_KEY"];

const MISSING_KEY_MESSAGE: &str = "GEMINI_API_KEY not found. Set the environment variable \
     or add it to the secrets file (GEMINI_API_KEY = \"...\").";

#[derive(Debug, Clone)]
enum InitFailure {
    Configuration(String),
    Initialization(String),
}

impl InitFailure {
    fn to_error(&self) -> DomainError {
        match self {
            Self::Configuration(msg) => DomainError::configuration(msg.clone()),
            Self::Initialization(msg) => DomainError::initialization(msg.clone()),
        }
    }
}

pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    PLACEHOLDER_KEYS.contains(&key)
}

/// Resolves the API key and builds the client handle exactly once.
///
/// The first outcome, success or failure, is kept for the lifetime of the
/// initializer; later calls neither read the secret store nor construct a new
/// client.
pub struct ClientInitializer {
    secrets: Arc<dyn SecretStore>,
    factory: Arc<dyn ClientFactory>,
    outcome: OnceLock<Result<Arc<dyn DocumentApi>, InitFailure>>,
}

impl ClientInitializer {
    pub fn new(secrets: Arc<dyn SecretStore>, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            secrets,
            factory,
            outcome: OnceLock::new(),
        }
    }

    pub fn client(&self) -> Result<Arc<dyn DocumentApi>, DomainError> {
        match self.outcome.get_or_init(|| self.initialize()) {
            Ok(client) => Ok(Arc::clone(client)),
            Err(failure) => Err(failure.to_error()),
        }
    }

    /// The `(client, error message)` pair the UI renders: exactly one side is set.
    pub fn client_or_message(&self) -> (Option<Arc<dyn DocumentApi>>, Option<String>) {
        match self.client() {
            Ok(client) => (Some(client), None),
            Err(e) => (None, Some(e.detail())),
        }
    }

    fn initialize(&self) -> Result<Arc<dyn DocumentApi>, InitFailure> {
        let key = match self.secrets.get(API_KEY_NAME) {
            Ok(Some(key)) => key,
            Ok(None) => {
                warn!("{} is not configured", API_KEY_NAME);
                return Err(InitFailure::Configuration(MISSING_KEY_MESSAGE.to_string()));
            }
            Err(e) => {
                warn!("Failed to read secrets: {}", e);
                return Err(InitFailure::Configuration(e.detail()));
            }
        };

        if is_placeholder_key(&key) {
            warn!("{} holds a placeholder value", API_KEY_NAME);
            return Err(InitFailure::Configuration(MISSING_KEY_MESSAGE.to_string()));
        }

        let client = self.factory.create(key.trim()).map_err(|e| {
            warn!("Client construction failed: {}", e);
            InitFailure::Initialization(format!("Error initializing Gemini Client: {}", e.detail()))
        })?;

        debug!("Client initialized for model {}", client.model());
        Ok(client)
    }
}
