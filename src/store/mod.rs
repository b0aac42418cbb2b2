//! Session persistence behind a trait.
//!
//! The engine never touches storage; sessions are loaded, transformed, and
//! saved by the API layer through [`SessionStore`]. The shipped backend is
//! in-memory. Sessions are independent and a duplicate submit resolves as
//! last-write-wins, so no optimistic concurrency control is kept here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Message, RequirementsSnapshot};

/// Everything durable about one wizard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub snapshot: RequirementsSnapshot,
    pub messages: Vec<Message>,
    /// Latched once the policy reaches the proposal offer; a later affirmative
    /// user reply then branches to the contact hand-off instead of another
    /// model turn.
    pub proposal_offered: bool,
    /// Latched when the user refuses the email question while it is pending;
    /// the policy then stops asking for contact details.
    #[serde(default)]
    pub email_declined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            snapshot: RequirementsSnapshot::default(),
            messages: Vec::new(),
            proposal_offered: false,
            email_declined: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

/// Storage seam for sessions. A database-backed implementation would slot in
/// here; the core and API code only ever see this trait.
pub trait SessionStore: Send + Sync {
    /// Create a fresh, empty session.
    fn create(&self) -> Result<SessionState, StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<SessionState>, StoreError>;

    /// Persist a session wholesale, bumping `updated_at`. The session must
    /// already exist.
    fn save(&self, session: SessionState) -> Result<SessionState, StoreError>;

    /// Remove a session (explicit session reset). Returns whether it existed.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// In-process store shared across handlers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<Uuid, SessionState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn create(&self) -> Result<SessionState, StoreError> {
        let session = SessionState::new();
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    fn get(&self, id: Uuid) -> Result<Option<SessionState>, StoreError> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        Ok(sessions.get(&id).cloned())
    }

    fn save(&self, mut session: SessionState) -> Result<SessionState, StoreError> {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        if !sessions.contains_key(&session.id) {
            return Err(StoreError::NotFound(session.id));
        }
        session.updated_at = Utc::now();
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        Ok(sessions.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_get_save_delete_round_trip() {
        let store = MemoryStore::new();

        let mut session = store.create().expect("create failed");
        assert!(store.get(session.id).expect("get failed").is_some());

        session.proposal_offered = true;
        let saved = store.save(session.clone()).expect("save failed");
        assert!(saved.updated_at >= saved.created_at);

        let loaded = store.get(session.id).expect("get failed").expect("missing");
        assert!(loaded.proposal_offered);

        assert!(store.delete(session.id).expect("delete failed"));
        assert!(store.get(session.id).expect("get failed").is_none());
    }

    #[test]
    fn saving_an_unknown_session_is_an_error() {
        let store = MemoryStore::new();
        let result = store.save(SessionState::new());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
