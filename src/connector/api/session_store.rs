use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ActiveDocument, Session};

pub const SESSION_COOKIE: &str = "docchat_session";

/// Sessions untouched for this long are dropped when a new one is created.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// A session looked up from a request.
pub struct ResolvedSession {
    pub id: String,
    pub session: Arc<Mutex<Session>>,
    /// Set when the id was not known yet and the cookie must be (re)issued.
    pub created: bool,
    /// Documents held by sessions evicted while resolving; still live remotely.
    pub evicted: Vec<ActiveDocument>,
}

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// Server-side session state keyed by cookie value.
///
/// Each session sits behind its own async mutex, so the actions of one
/// browser run one at a time while different browsers proceed independently.
/// Creating a session first evicts every idle one, which bounds the map for
/// clients that never send the cookie back.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Find the session for `id`, creating one when absent.
    ///
    /// Ids that are not UUIDs are never trusted; a fresh id is issued instead.
    pub async fn resolve(&self, id: Option<&str>) -> ResolvedSession {
        let id = id.filter(|id| Uuid::parse_str(id).is_ok());
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return ResolvedSession {
                    id: id.to_string(),
                    session: Arc::clone(&entry.session),
                    created: false,
                    evicted: Vec::new(),
                };
            }
        }

        let evicted = Self::evict_idle(&mut sessions, now, self.idle_timeout);

        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        debug!("Creating session {}", id);

        let session = Arc::new(Mutex::new(Session::new()));
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );

        ResolvedSession {
            id,
            session,
            created: true,
            evicted,
        }
    }

    fn evict_idle(
        sessions: &mut HashMap<String, SessionEntry>,
        now: Instant,
        idle_timeout: Duration,
    ) -> Vec<ActiveDocument> {
        let mut documents = Vec::new();

        sessions.retain(|id, entry| {
            if now.duration_since(entry.last_seen) < idle_timeout {
                return true;
            }
            // A locked session is mid-request.
            let Ok(mut session) = entry.session.try_lock() else {
                return true;
            };
            if let Some(document) = session.take_document() {
                documents.push(document);
            }
            debug!("Evicting idle session {}", id);
            false
        });

        documents
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Detach every active document, leaving sessions without one.
    pub async fn take_documents(&self) -> Vec<ActiveDocument> {
        let sessions: Vec<Arc<Mutex<Session>>> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.session))
            .collect();

        let mut documents = Vec::new();
        for session in sessions {
            let mut session = session.lock().await;
            if let Some(document) = session.take_document() {
                documents.push(document);
            }
            session.clear();
        }
        documents
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the session id from a `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RemoteFile, RemoteFileState};

    #[test]
    fn cookie_parsing_finds_session_among_others() {
        let header = "theme=dark; docchat_session=abc-123 ; other=1";
        assert_eq!(session_id_from_cookie(header), Some("abc-123"));
        assert_eq!(session_id_from_cookie("theme=dark"), None);
        assert_eq!(session_id_from_cookie(""), None);
    }

    #[tokio::test]
    async fn resolve_reuses_known_sessions() {
        let store = SessionStore::new();

        let first = store.resolve(None).await;
        assert!(first.created);

        let again = store.resolve(Some(&first.id)).await;
        assert!(!again.created);
        assert_eq!(again.id, first.id);
        assert!(Arc::ptr_eq(&first.session, &again.session));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn resolve_replaces_untrusted_ids() {
        let store = SessionStore::new();
        let resolved = store.resolve(Some("../../not-a-uuid")).await;

        assert!(resolved.created);
        assert_ne!(resolved.id, "../../not-a-uuid");
        assert!(Uuid::parse_str(&resolved.id).is_ok());
    }

    #[tokio::test]
    async fn unknown_uuid_is_adopted() {
        let store = SessionStore::new();
        let id = Uuid::new_v4().to_string();
        let resolved = store.resolve(Some(&id)).await;

        assert!(resolved.created);
        assert_eq!(resolved.id, id);
    }

    fn held_document(name: &str) -> ActiveDocument {
        ActiveDocument::new(
            RemoteFile::new(name, "mock://x", "a.txt", "text/plain", RemoteFileState::Active),
            "hash",
        )
    }

    #[tokio::test]
    async fn cookieless_clients_do_not_grow_the_store() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);
        for _ in 0..1000 {
            store.resolve(None).await;
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn recent_sessions_are_kept() {
        let store = SessionStore::new();
        for _ in 0..3 {
            store.resolve(None).await;
        }
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn eviction_hands_back_held_documents() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);
        let first = store.resolve(None).await;
        first
            .session
            .lock()
            .await
            .start_document(held_document("files/one"));

        let second = store.resolve(None).await;

        assert_eq!(second.evicted.len(), 1);
        assert_eq!(second.evicted[0].remote().name(), "files/one");
        assert!(first.session.lock().await.remote_file().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn busy_sessions_are_not_evicted() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);
        let first = store.resolve(None).await;
        let _guard = first.session.lock().await;

        let second = store.resolve(None).await;

        assert!(second.evicted.is_empty());
        assert_eq!(store.len().await, 2);
    }
}
