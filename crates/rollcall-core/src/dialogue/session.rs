//! Per-user dialogue sessions.
//!
//! Sessions are ephemeral process-local state. They are never persisted and
//! do not survive a restart; an abandoned session simply sits in the map
//! until the next `/start` replaces it or `/cancel` removes it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Which field the dialogue is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    AwaitingName,
    AwaitingAge,
    AwaitingGrade,
}

/// Ephemeral per-user dialogue state: the current step plus the validated
/// fields collected so far.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: DialogueState,
    pub name: Option<String>,
    pub age: Option<u32>,
}

impl Session {
    /// A fresh session at the first step with no collected fields.
    pub fn new() -> Self {
        Self {
            state: DialogueState::AwaitingName,
            name: None,
            age: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session store keyed by user identifier.
///
/// At most one session exists per user. The store is shared across handler
/// tasks, so access goes through an async RwLock.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the user's session, if any.
    pub async fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// Insert or replace the user's session.
    pub async fn put(&self, user_id: &str, session: Session) {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session);
    }

    /// Remove the user's session. Returns true if one existed.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.sessions.write().await.remove(user_id).is_some()
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are active.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
