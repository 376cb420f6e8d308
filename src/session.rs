//! Per-browser chat sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{Model, Mood};
use crate::constants::SESSION_IDLE_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One user's transcript and selections. The transcript is append-only
/// until cleared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub model: Model,
    pub mood: Mood,
    messages: Vec<Message>,
    /// Bumped on every clear; a reply started before a clear is dropped.
    #[serde(skip)]
    epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Entry {
    fn touch(&mut self) -> &mut Session {
        self.last_seen = Instant::now();
        &mut self.session
    }
}

/// All live sessions, keyed by the id stored in the session cookie.
/// Sessions idle for longer than the TTL are evicted.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Returns the id of an existing session, or creates a new one. The flag
    /// is true when a session was created. Idle sessions are evicted first.
    pub async fn ensure(&self, id: Option<Uuid>) -> (Uuid, bool) {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= self.idle_ttl);
        if sessions.len() < before {
            debug!(evicted = before - sessions.len(), "Evicted idle sessions");
        }

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.touch();
                return (id, false);
            }
        }
        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Entry {
                session: Session::new(),
                last_seen: Instant::now(),
            },
        );
        debug!(%id, "Created session");
        (id, true)
    }

    /// Runs `f` against the session, if it exists.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|entry| f(entry.touch()))
    }

    /// Copy of the session's current state.
    pub async fn snapshot(&self, id: Uuid) -> Option<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut session = Session::new();
        for i in 0..25 {
            let message = if i % 2 == 0 {
                Message::user(format!("message {i}"))
            } else {
                Message::assistant(format!("message {i}"))
            };
            session.append(message);
        }

        assert_eq!(session.len(), 25);
        for (i, message) in session.messages().iter().enumerate() {
            assert_eq!(message.content, format!("message {i}"));
        }
    }

    #[test]
    fn test_role_alternation_not_enforced() {
        let mut session = Session::new();
        session.append(Message::user("one"));
        session.append(Message::user("two"));
        assert_eq!(session.len(), 2);
        assert!(session.messages().iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn test_clear_empties_transcript() {
        for n in [0, 1, 10] {
            let mut session = Session::new();
            session.mood = Mood::Sad;
            for i in 0..n {
                session.append(Message::user(i.to_string()));
            }
            session.clear();
            assert!(session.is_empty());
            assert_eq!(session.epoch(), 1);
            // Selections survive a clear.
            assert_eq!(session.mood, Mood::Sad);
        }
    }

    #[test]
    fn test_message_serializes_lowercase_role() {
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[tokio::test]
    async fn test_store_ensure_reuses_known_id() {
        let store = SessionStore::new();
        let (id, created) = store.ensure(None).await;
        assert!(created);

        let (same, created) = store.ensure(Some(id)).await;
        assert_eq!(same, id);
        assert!(!created);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_replaces_unknown_id() {
        let store = SessionStore::new();
        let stale = Uuid::new_v4();
        let (id, created) = store.ensure(Some(stale)).await;
        assert!(created);
        assert_ne!(id, stale);
    }

    #[tokio::test]
    async fn test_store_sessions_are_isolated() {
        let store = SessionStore::new();
        let (a, _) = store.ensure(None).await;
        let (b, _) = store.ensure(None).await;

        store
            .with_session(a, |s| s.append(Message::user("only in a")))
            .await
            .unwrap();

        assert_eq!(store.snapshot(a).await.unwrap().len(), 1);
        assert!(store.snapshot(b).await.unwrap().is_empty());
        assert!(store.with_session(Uuid::new_v4(), |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn test_store_evicts_idle_sessions() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(50));
        let (stale, _) = store.ensure(None).await;
        let (_, _) = store.ensure(None).await;
        assert_eq!(store.len().await, 2);

        tokio::time::sleep(Duration::from_millis(120)).await;

        let (fresh, created) = store.ensure(Some(stale)).await;
        assert!(created);
        assert_ne!(fresh, stale);
        assert_eq!(store.len().await, 1);
        assert!(store.snapshot(stale).await.is_none());
    }

    #[tokio::test]
    async fn test_store_activity_keeps_session_alive() {
        let store = SessionStore::with_idle_ttl(Duration::from_millis(200));
        let (id, _) = store.ensure(None).await;

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(80)).await;
            store
                .with_session(id, |s| s.append(Message::user("still here")))
                .await
                .unwrap();
        }

        let (same, created) = store.ensure(Some(id)).await;
        assert_eq!(same, id);
        assert!(!created);
        assert_eq!(store.snapshot(id).await.unwrap().len(), 4);
    }
}
