use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// File extensions the document picker accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "docx", "pptx", "md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Txt,
    Docx,
    Pptx,
    Md,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "md" => Some(Self::Md),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Md => "md",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Computes the SHA-256 of an uploaded blob, used to recognise repeated uploads.
pub fn compute_content_hash(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(bytes);
    format!("{:x}", hash)
}

/// An in-memory document received from the file picker.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    file_name: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
    content_hash: String,
}

impl DocumentUpload {
    /// Validates the file name against [`ACCEPTED_EXTENSIONS`].
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let file_name = file_name.into();
        let base_name = Path::new(&file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_input("Document has no file name"))?
            .to_string();

        let kind = DocumentKind::from_file_name(&base_name).ok_or_else(|| {
            DomainError::invalid_input(format!(
                "Unsupported file type for '{}'. Accepted: {}",
                base_name,
                ACCEPTED_EXTENSIONS.join(", ")
            ))
        })?;

        let content_hash = compute_content_hash(&bytes);

        Ok(Self {
            file_name: base_name,
            kind,
            bytes,
            content_hash,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}
