use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::types::EditorState;

/// Sessions untouched for this long are evicted
pub const SESSION_IDLE_TTL: Duration = Duration::hours(12);

struct SessionEntry {
    title: String,
    state: EditorState,
    touched: OffsetDateTime,
}

/// In-memory editor sessions keyed by the session cookie value.
///
/// Only sessions with a live editor are kept: leaving the editor removes
/// the entry, and entries idle past the TTL are evicted on every write.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(SESSION_IDLE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), ttl }
    }

    /// Fresh random session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        let now = OffsetDateTime::now_utc();
        self.lock()
            .get(session_id)
            .is_some_and(|entry| now - entry.touched < self.ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Editor state of `session_id`, if it was last editing `title`
    pub fn load(&self, session_id: &str, title: &str) -> Option<EditorState> {
        let now = OffsetDateTime::now_utc();
        self.lock()
            .get(session_id)
            .filter(|entry| entry.title == title && now - entry.touched < self.ttl)
            .map(|entry| entry.state.clone())
    }

    pub fn store(&self, session_id: &str, title: &str, state: EditorState) {
        let now = OffsetDateTime::now_utc();
        debug!("Session {} editing '{}': {:?}", session_id, title, state);
        let mut sessions = self.lock();
        Self::evict_idle(&mut sessions, now, self.ttl);
        sessions.insert(
            session_id.to_string(),
            SessionEntry { title: title.to_string(), state, touched: now },
        );
    }

    /// Forget the session entirely
    pub fn clear(&self, session_id: &str) {
        self.lock().remove(session_id);
    }

    /// Drop every entry idle at `now`
    pub fn evict_idle_at(&self, now: OffsetDateTime) {
        Self::evict_idle(&mut self.lock(), now, self.ttl);
    }

    fn evict_idle(sessions: &mut HashMap<String, SessionEntry>, now: OffsetDateTime, ttl: Duration) {
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.touched < ttl);
        if sessions.len() < before {
            debug!("Evicted {} idle editor sessions", before - sessions.len());
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
