use crate::domain::DomainError;

/// Read-only lookup of named secrets.
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` when the key is simply absent; `Err` when the store itself
    /// could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;
}
