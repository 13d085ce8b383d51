use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::domain::{ActiveDocument, Notice};

use super::router::{build_router, AppState};
use super::session_store::SessionStore;
use super::Container;

/// Run the web UI until Ctrl-C, then try to delete every document still held.
pub async fn serve(
    container: Arc<Container>,
    addr: SocketAddr,
    max_upload_bytes: usize,
) -> Result<()> {
    if let Some(err) = container.client_error() {
        warn!("Client failed to initialize: {}", err);
    }

    let state = AppState::new(Arc::clone(&container));
    let sessions = Arc::clone(&state.sessions);
    let app = build_router(state, max_upload_bytes);

    let listener = TcpListener::bind(addr).await?;
    info!("DocChat listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for notice in cleanup_remote_files(&container, &sessions).await {
        info!("{}", notice.message());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Best-effort deletion of the documents every session still holds.
pub async fn cleanup_remote_files(container: &Container, sessions: &SessionStore) -> Vec<Notice> {
    let documents = sessions.take_documents().await;
    delete_documents(container, &documents).await
}

/// Delete documents no session refers to anymore.
pub async fn delete_documents(container: &Container, documents: &[ActiveDocument]) -> Vec<Notice> {
    if documents.is_empty() {
        return Vec::new();
    }

    let use_case = match container.delete_use_case() {
        Ok(use_case) => use_case,
        Err(e) => {
            warn!("Skipping cleanup of {} files: {}", documents.len(), e);
            return Vec::new();
        }
    };

    let mut notices = Vec::with_capacity(documents.len());
    for document in documents {
        notices.push(use_case.execute(document.remote()).await);
    }
    notices
}
