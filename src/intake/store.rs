//! In-memory session registry.
//!
//! Sessions are held behind their own [`Mutex`]: the engine keeps a
//! session locked for a whole turn, so two messages for the same session are
//! processed one after the other while different sessions run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::session::IntakeSession;

/// Handle to a registered session.
pub type SharedSession = Arc<Mutex<IntakeSession>>;

/// Concurrent map from session id to session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its own id, returning its handle.
    pub async fn insert(&self, session: IntakeSession) -> SharedSession {
        let id = session.id().to_owned();
        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(id, Arc::clone(&shared));
        shared
    }

    /// Look up a session by id.
    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Whether `id` is registered.
    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Unregister a session.
    pub async fn remove(&self, id: &str) -> Option<SharedSession> {
        self.sessions.write().await.remove(id)
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions untouched for longer than `max_idle`.
    ///
    /// Sessions with a handle checked out (a turn that has looked the session
    /// up, whether or not it holds the lock yet) are kept. Returns the number
    /// removed.
    pub async fn remove_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now()
            .checked_sub_signed(max_idle)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, shared| {
            if Arc::strong_count(shared) > 1 {
                return true;
            }
            match shared.try_lock() {
                Ok(session) => {
                    let keep = session.updated_at() >= cutoff;
                    if !keep {
                        debug!(session_id = %id, "evicting idle session");
                    }
                    keep
                }
                Err(_) => true,
            }
        });
        before.saturating_sub(sessions.len())
    }
}
