use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::SecretStore;
use crate::domain::DomainError;

/// Secrets from the process environment. A blank variable counts as unset,
/// so `KEY=` does not shadow later layers.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(std::env::var(key).ok().filter(|value| !value.trim().is_empty()))
    }
}

/// Secrets from a TOML file of top-level string keys:
///
/// ```toml
/// GEMINI_API_KEY = "..."
/// ```
///
/// A missing file behaves like an empty one.
#[derive(Debug, Clone)]
pub struct TomlSecretStore {
    path: PathBuf,
}

impl TomlSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, toml::Value>, DomainError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No secrets file at {}", self.path.display());
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(DomainError::configuration(format!(
                    "Cannot read secrets file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        toml::from_str(&content).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid secrets file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl SecretStore for TomlSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let secrets = self.load()?;
        match secrets.get(key) {
            None => Ok(None),
            Some(toml::Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(DomainError::configuration(format!(
                "{} in {} must be a string",
                key,
                self.path.display()
            ))),
        }
    }
}

/// Fixed secrets held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretStore {
    values: HashMap<String, String>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretStore for InMemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Consults each store in order and returns the first value found.
pub struct LayeredSecretStore {
    layers: Vec<Arc<dyn SecretStore>>,
}

impl LayeredSecretStore {
    pub fn new(layers: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { layers }
    }

    /// Environment first, then the TOML file at `path`.
    pub fn env_then_file(path: impl Into<PathBuf>) -> Self {
        let layers: Vec<Arc<dyn SecretStore>> = vec![
            Arc::new(EnvSecretStore),
            Arc::new(TomlSecretStore::new(path)),
        ];
        Self::new(layers)
    }
}

impl SecretStore for LayeredSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        for layer in &self.layers {
            if let Some(value) = layer.get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_store_reads_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GEMINI_API_KEY = \"abc123\"\nOTHER = 5\n").unwrap();

        let store = TomlSecretStore::new(&path);
        assert_eq!(store.get("GEMINI_API_KEY").unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.get("MISSING").unwrap(), None);
        assert!(store.get("OTHER").is_err());
    }

    #[test]
    fn missing_toml_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlSecretStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.get("GEMINI_API_KEY").unwrap(), None);
    }

    #[test]
    fn malformed_toml_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GEMINI_API_KEY = ").unwrap();

        let err = TomlSecretStore::new(&path).get("GEMINI_API_KEY").unwrap_err();
        assert!(matches!(err, DomainError::ConfigurationError(_)));
    }

    #[test]
    fn blank_env_value_falls_through_to_file() {
        const KEY: &str = "DOCCHAT_TEST_BLANK_ENV_SECRET";
        std::env::set_var(KEY, "  ");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, format!("{} = \"from-file\"\n", KEY)).unwrap();

        assert_eq!(EnvSecretStore.get(KEY).unwrap(), None);
        let store = LayeredSecretStore::env_then_file(&path);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("from-file"));

        std::env::remove_var(KEY);
    }

    #[test]
    fn layered_store_prefers_earlier_layers() {
        let first = InMemorySecretStore::new().with("A", "from-first");
        let second = InMemorySecretStore::new()
            .with("A", "from-second")
            .with("B", "only-second");
        let layers: Vec<Arc<dyn SecretStore>> = vec![Arc::new(first), Arc::new(second)];
        let store = LayeredSecretStore::new(layers);

        assert_eq!(store.get("A").unwrap().as_deref(), Some("from-first"));
        assert_eq!(store.get("B").unwrap().as_deref(), Some("only-second"));
        assert_eq!(store.get("C").unwrap(), None);
    }
}
