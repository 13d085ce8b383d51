use serde::{Deserialize, Serialize};

/// Processing state of a file held by the remote file-storage endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteFileState {
    Processing,
    Active,
    Failed,
}

impl RemoteFileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
        }
    }

    /// Unknown or missing states are treated as still processing.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("ACTIVE") => Self::Active,
            Some("FAILED") => Self::Failed,
            _ => Self::Processing,
        }
    }
}

/// Opaque reference to a document stored server-side.
///
/// `name` (e.g. `files/abc123`) addresses the file for deletion, `uri` is what
/// generation requests point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    name: String,
    uri: String,
    display_name: String,
    mime_type: String,
    state: RemoteFileState,
}

impl RemoteFile {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        state: RemoteFileState,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn state(&self) -> RemoteFileState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RemoteFileState::Active
    }

    pub fn with_state(mut self, state: RemoteFileState) -> Self {
        self.state = state;
        self
    }
}
