use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use super::controller::{ChatController, DocumentController, SessionController};
use super::error::ApiError;
use super::server::delete_documents;
use super::session_store::{session_cookie, session_id_from_cookie, ResolvedSession, SessionStore};
use super::view::ChatRequest;
use super::Container;

const INDEX_HTML: &str = include_str!("static/index.html");

/// Multipart field carrying the picked document.
pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub container: Arc<Container>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/session", get(show_session))
        .route(
            "/api/documents",
            post(process_document)
                .delete(delete_document)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/chat", post(chat))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> ResolvedSession {
    let id = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookie);
    let mut resolved = state.sessions.resolve(id).await;

    let evicted = std::mem::take(&mut resolved.evicted);
    if !evicted.is_empty() {
        let container = Arc::clone(&state.container);
        tokio::spawn(async move {
            for notice in delete_documents(&container, &evicted).await {
                info!("Idle session cleanup: {}", notice.message());
            }
        });
    }

    resolved
}

fn respond<T: Serialize>(resolved: &ResolvedSession, body: T) -> Response {
    let mut response = Json(body).into_response();
    if resolved.created {
        if let Ok(cookie) = HeaderValue::from_str(&session_cookie(&resolved.id)) {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
    }
    response
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?;
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes.to_vec()));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// GET /api/session
async fn show_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let resolved = resolve(&state, &headers).await;
    let session = resolved.session.lock().await;
    let view = SessionController::new(&state.container).view(&session);
    drop(session);

    respond(&resolved, view)
}

/// POST /api/documents
async fn process_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let resolved = resolve(&state, &headers).await;
    // Fail fast before reading a large body.
    state.container.client()?;

    let (file_name, bytes) = read_file_field(&mut multipart).await?;

    let mut session = resolved.session.lock().await;
    let body = DocumentController::new(&state.container)
        .process(&mut session, &file_name, bytes)
        .await?;
    drop(session);

    Ok(respond(&resolved, body))
}

/// DELETE /api/documents
async fn delete_document(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let resolved = resolve(&state, &headers).await;

    let mut session = resolved.session.lock().await;
    let body = DocumentController::new(&state.container)
        .delete(&mut session)
        .await?;
    drop(session);

    Ok(respond(&resolved, body))
}

/// POST /api/chat
async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let resolved = resolve(&state, &headers).await;

    let mut session = resolved.session.lock().await;
    let body = ChatController::new(&state.container)
        .chat(&mut session, &request.prompt)
        .await?;
    drop(session);

    Ok(respond(&resolved, body))
}
