use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::application::{ClientFactory, ContentGenerator, DocumentApi, FileStorage};
use crate::domain::{DomainError, RemoteFile, RemoteFileState};

pub const DEFAULT_API_ROOT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: u32 = 60;

/// `generateContent` request payload.
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

/// Minimal subset of the `generateContent` response we care about.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// HTTP client for the Gemini Files and `generateContent` REST endpoints.
///
/// Uploads use the resumable protocol (a `start` request carrying metadata,
/// then a single `upload, finalize` request carrying the bytes) and wait for
/// the file to leave the `PROCESSING` state before returning, since
/// generation requests against a processing file are rejected.
///
/// No request timeout is configured and nothing is retried.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// `{root}/v1beta`
    base_url: String,
    /// `{root}/upload/v1beta/files`
    upload_url: String,
    poll_interval: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_root: impl AsRef<str>,
    ) -> Result<Self, DomainError> {
        let root = api_root.as_ref().trim_end_matches('/');
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DomainError::initialization(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: format!("{root}/{API_VERSION}"),
            upload_url: format!("{root}/upload/{API_VERSION}/files"),
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn parse_file(value: &Value, display_name: &str, mime_type: &str) -> Option<RemoteFile> {
        // Upload responses wrap the file in `{"file": ...}`, `files.get` does not.
        let file = value.get("file").unwrap_or(value);

        let name = file.get("name")?.as_str()?;
        let uri = file.get("uri").and_then(Value::as_str).unwrap_or_default();
        let display_name = file
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(display_name);
        let mime_type = file
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or(mime_type);
        let state = RemoteFileState::parse(file.get("state").and_then(Value::as_str));

        Some(RemoteFile::new(name, uri, display_name, mime_type, state))
    }

    async fn start_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        size: usize,
    ) -> Result<String, DomainError> {
        let metadata = json!({ "file": { "display_name": display_name } });

        let response = self
            .client
            .post(&self.upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| DomainError::upload(format!("upload start request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::upload(format!(
                "upload start returned {status}: {body}"
            )));
        }

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| DomainError::upload("no upload URL in response headers"))
    }

    async fn wait_until_active(&self, mut file: RemoteFile) -> Result<RemoteFile, DomainError> {
        let url = format!("{}/{}", self.base_url, file.name());

        for _ in 0..MAX_POLLS {
            match file.state() {
                RemoteFileState::Active => return Ok(file),
                RemoteFileState::Failed => {
                    return Err(DomainError::upload(format!(
                        "the service failed to process {}",
                        file.name()
                    )))
                }
                RemoteFileState::Processing => {}
            }

            tokio::time::sleep(self.poll_interval).await;
            debug!("Polling state of {}", file.name());

            let response = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await
                .map_err(|e| DomainError::upload(format!("file status request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(DomainError::upload(format!(
                    "file status returned {status}: {body}"
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| DomainError::upload(format!("invalid file status response: {e}")))?;

            let state = Self::parse_file(&body, file.display_name(), file.mime_type())
                .map(|f| f.state())
                .unwrap_or(RemoteFileState::Processing);
            file = file.with_state(state);
        }

        Err(DomainError::upload(format!(
            "{} still processing after {} checks",
            file.name(),
            MAX_POLLS
        )))
    }

    fn extract_text(body: GenerateContentResponse) -> Result<String, DomainError> {
        let Some(candidate) = body.candidates.into_iter().next() else {
            let reason = body
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(DomainError::generation(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(DomainError::generation(format!(
                "model returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl FileStorage for GeminiClient {
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::upload(format!("could not read {}: {e}", path.display()))
        })?;
        let size = bytes.len();

        let session_url = self.start_upload(display_name, mime_type, size).await?;

        let response = self
            .client
            .post(&session_url)
            .header("Content-Length", size.to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| DomainError::upload(format!("upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::upload(format!(
                "upload returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DomainError::upload(format!("invalid upload response: {e}")))?;

        let file = Self::parse_file(&body, display_name, mime_type)
            .ok_or_else(|| DomainError::upload("upload response missing file name"))?;

        debug!("Uploaded {} as {} ({})", display_name, file.name(), file.state().as_str());

        // The caller never sees a handle for a file that did not become
        // usable, so it has to be removed here.
        let name = file.name().to_string();
        match self.wait_until_active(file).await {
            Ok(file) => Ok(file),
            Err(e) => {
                if let Err(delete_err) = self.delete_file(&name).await {
                    warn!("Failed to remove unusable upload {}: {}", name, delete_err);
                }
                Err(e)
            }
        }
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let url = format!("{}/{}", self.base_url, name);

        let response = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DomainError::deletion(format!("delete request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::deletion(format!(
                "delete returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, file: &RemoteFile, prompt: &str) -> Result<String, DomainError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::File {
                        file_data: FileData {
                            mime_type: file.mime_type(),
                            file_uri: file.uri(),
                        },
                    },
                    RequestPart::Text { text: prompt },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini returned {status}: {body}");
            return Err(DomainError::generation(format!(
                "API returned {status}: {body}"
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| DomainError::generation(format!("failed to parse response: {e}")))?;

        Self::extract_text(body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Builds [`GeminiClient`]s for a fixed model and API root.
pub struct GeminiClientFactory {
    model: String,
    api_root: String,
}

impl GeminiClientFactory {
    pub fn new(model: impl Into<String>, api_root: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_root: api_root.into(),
        }
    }

    /// Construct from environment variables with hosted-API defaults:
    ///
    /// | Variable          | Default                                     |
    /// |-------------------|---------------------------------------------|
    /// | `GEMINI_MODEL`    | `gemini-2.5-flash`                          |
    /// | `GEMINI_API_ROOT` | `https://generativelanguage.googleapis.com` |
    pub fn from_env() -> Self {
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let root =
            std::env::var("GEMINI_API_ROOT").unwrap_or_else(|_| DEFAULT_API_ROOT.to_string());
        Self::new(model, root)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for GeminiClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_API_ROOT)
    }
}

impl ClientFactory for GeminiClientFactory {
    fn create(&self, api_key: &str) -> Result<Arc<dyn DocumentApi>, DomainError> {
        let client = GeminiClient::new(api_key, &self.model, &self.api_root)?;
        Ok(Arc::new(client))
    }
}
