//! GeminiClient against a loopback fake of the Gemini REST endpoints.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use docchat::{ContentGenerator, DomainError, FileStorage, GeminiClient, RemoteFileState};

const API_KEY: &str = "test-key";
const MODEL: &str = "gemini-2.5-flash";

#[derive(Default)]
struct FakeGemini {
    display_names: Mutex<Vec<String>>,
    uploaded: Mutex<Vec<Vec<u8>>>,
    polls: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    generate_requests: Mutex<Vec<Value>>,
    processing_fails: AtomicBool,
}

type Fake = Arc<FakeGemini>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

fn host(headers: &HeaderMap) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"code": 401, "message": "API key not valid"}})),
    )
        .into_response()
}

async fn start_upload(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Json(metadata): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(
        headers.get("x-goog-upload-command").unwrap(),
        "start"
    );
    assert_eq!(
        headers.get("x-goog-upload-protocol").unwrap(),
        "resumable"
    );

    let name = metadata["file"]["display_name"].as_str().unwrap_or_default();
    fake.display_names.lock().unwrap().push(name.to_string());

    let upload_url = format!("http://{}/upload-session/1", host(&headers));
    (StatusCode::OK, [("x-goog-upload-url", upload_url)], "").into_response()
}

async fn finish_upload(State(fake): State<Fake>, headers: HeaderMap, body: Bytes) -> Response {
    assert_eq!(
        headers.get("x-goog-upload-command").unwrap(),
        "upload, finalize"
    );
    fake.uploaded.lock().unwrap().push(body.to_vec());

    Json(json!({
        "file": {
            "name": "files/abc",
            "displayName": "report.pdf",
            "mimeType": "application/pdf",
            "uri": format!("http://{}/v1beta/files/abc", host(&headers)),
            "state": "PROCESSING"
        }
    }))
    .into_response()
}

async fn get_file(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let polls = fake.polls.fetch_add(1, Ordering::SeqCst) + 1;
    let state = if fake.processing_fails.load(Ordering::SeqCst) {
        "FAILED"
    } else if polls >= 2 {
        "ACTIVE"
    } else {
        "PROCESSING"
    };

    Json(json!({ "name": format!("files/{id}"), "state": state })).into_response()
}

async fn delete_file(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut deleted = fake.deleted.lock().unwrap();
    if id != "abc" || deleted.contains(&id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": "File not found"}})),
        )
            .into_response();
    }
    deleted.push(id);
    Json(json!({})).into_response()
}

async fn generate(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Path(action): Path<String>,
    Json(request): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(action, format!("{MODEL}:generateContent"));

    let prompt = request["contents"][0]["parts"][1]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    fake.generate_requests.lock().unwrap().push(request);

    if prompt == "explode" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": 500, "message": "internal"}})),
        )
            .into_response();
    }

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "The report covers " }, { "text": prompt }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

async fn spawn_fake() -> (Fake, String) {
    let fake: Fake = Arc::new(FakeGemini::default());
    let app = Router::new()
        .route("/upload/v1beta/files", post(start_upload))
        .route("/upload-session/{id}", post(finish_upload))
        .route("/v1beta/files/{id}", get(get_file).delete(delete_file))
        .route("/v1beta/models/{action}", post(generate))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{}", addr))
}

fn client(root: &str, key: &str) -> GeminiClient {
    GeminiClient::new(key, MODEL, root)
        .unwrap()
        .with_poll_interval(Duration::from_millis(5))
}

fn write_document(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("upload-report.pdf");
    std::fs::write(&path, b"%PDF-1.4 fake").unwrap();
    path
}

#[tokio::test]
async fn test_upload_waits_until_file_is_active() {
    let (fake, root) = spawn_fake().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir);

    let file = client(&root, API_KEY)
        .upload_file(&path, "report.pdf", "application/pdf")
        .await
        .expect("upload");

    assert_eq!(file.name(), "files/abc");
    assert_eq!(file.display_name(), "report.pdf");
    assert_eq!(file.state(), RemoteFileState::Active);
    assert_eq!(fake.polls.load(Ordering::SeqCst), 2);
    assert_eq!(fake.uploaded.lock().unwrap()[0], b"%PDF-1.4 fake");
    assert_eq!(fake.display_names.lock().unwrap()[0], "report.pdf");
}

#[tokio::test]
async fn test_upload_with_bad_key_is_an_upload_error() {
    let (_fake, root) = spawn_fake().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir);

    let err = client(&root, "wrong-key")
        .upload_file(&path, "report.pdf", "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UploadError(_)));
    assert!(err.detail().contains("401"));
}

#[tokio::test]
async fn test_generate_sends_file_then_prompt() {
    let (fake, root) = spawn_fake().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir);
    let gemini = client(&root, API_KEY);

    let file = gemini
        .upload_file(&path, "report.pdf", "application/pdf")
        .await
        .unwrap();
    let text = gemini.generate(&file, "quarterly revenue").await.unwrap();

    assert_eq!(text, "The report covers quarterly revenue");

    let requests = fake.generate_requests.lock().unwrap();
    let parts = &requests[0]["contents"][0]["parts"];
    assert_eq!(parts[0]["fileData"]["fileUri"], file.uri());
    assert_eq!(parts[0]["fileData"]["mimeType"], "application/pdf");
    assert_eq!(parts[1]["text"], "quarterly revenue");
}

#[tokio::test]
async fn test_generate_failure_is_a_generation_error() {
    let (_fake, root) = spawn_fake().await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir);
    let gemini = client(&root, API_KEY);
    let file = gemini
        .upload_file(&path, "report.pdf", "application/pdf")
        .await
        .unwrap();

    let err = gemini.generate(&file, "explode").await.unwrap_err();

    assert!(matches!(err, DomainError::GenerationError(_)));
}

#[tokio::test]
async fn test_deleting_twice_reports_not_found() {
    let (fake, root) = spawn_fake().await;
    let gemini = client(&root, API_KEY);

    gemini.delete_file("files/abc").await.expect("first delete");
    let err = gemini.delete_file("files/abc").await.unwrap_err();

    assert!(matches!(err, DomainError::DeletionError(_)));
    assert!(err.detail().contains("404"));
    assert_eq!(fake.deleted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_processing_removes_remote_file() {
    let (fake, root) = spawn_fake().await;
    fake.processing_fails.store(true, Ordering::SeqCst);
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(&dir);

    let err = client(&root, API_KEY)
        .upload_file(&path, "report.pdf", "application/pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UploadError(_)));
    assert!(err.detail().contains("files/abc"));
    assert_eq!(*fake.deleted.lock().unwrap(), vec!["abc".to_string()]);
}
