use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Upload error: {0}")]
    UploadError(String),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Deletion error: {0}")]
    DeletionError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::InitializationError(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::UploadError(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationError(msg.into())
    }

    pub fn deletion(msg: impl Into<String>) -> Self {
        Self::DeletionError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Errors that prevent a session from starting at all.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError(_) | Self::InitializationError(_)
        )
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// The message without the variant prefix, suitable for showing to a user.
    pub fn detail(&self) -> String {
        match self {
            Self::ConfigurationError(m)
            | Self::InitializationError(m)
            | Self::UploadError(m)
            | Self::GenerationError(m)
            | Self::DeletionError(m)
            | Self::InvalidInput(m)
            | Self::Internal(m) => m.clone(),
            Self::IoError(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_startup_errors_are_fatal_to_session() {
        assert!(DomainError::configuration("missing key").is_fatal_to_session());
        assert!(DomainError::initialization("bad client").is_fatal_to_session());
        assert!(!DomainError::upload("boom").is_fatal_to_session());
        assert!(!DomainError::generation("boom").is_fatal_to_session());
        assert!(!DomainError::deletion("boom").is_fatal_to_session());
    }

    #[test]
    fn detail_strips_the_variant_prefix() {
        let err = DomainError::upload("quota exceeded");
        assert_eq!(err.to_string(), "Upload error: quota exceeded");
        assert_eq!(err.detail(), "quota exceeded");
    }
}
