use std::sync::Arc;

use crate::domain::DomainError;

use super::{ContentGenerator, FileStorage};

/// The authenticated client handle: every remote endpoint the app talks to.
pub trait DocumentApi: FileStorage + ContentGenerator {}

impl<T: FileStorage + ContentGenerator> DocumentApi for T {}

/// Builds a client handle from an API key.
pub trait ClientFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<Arc<dyn DocumentApi>, DomainError>;
}
