//! In-memory session store
//!
//! Keeps suspended sessions between turns and serializes turns per session:
//! each session sits behind its own mutex, so independent sessions advance
//! in parallel while two turns of one session never overlap.

use crate::models::state::SessionState;
use crate::orchestrator::checkpoint::SessionSnapshot;
use crate::orchestrator::engine::{TurnReport, WorkflowError, WorkflowOrchestrator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty session
    pub fn create(&self) -> Result<Uuid, WorkflowError> {
        self.insert(SessionState::new())
    }

    /// Add an existing session; replaces any session with the same id
    pub fn insert(&self, state: SessionState) -> Result<Uuid, WorkflowError> {
        let id = state.id();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| WorkflowError::SessionPoisoned(id))?;
        sessions.insert(id, Arc::new(Mutex::new(state)));
        debug!(session_id = %id, "session stored");
        Ok(id)
    }

    /// Run `f` with exclusive access to one session
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Result<R, WorkflowError> {
        let session = self.handle(id)?;
        let mut guard = session
            .lock()
            .map_err(|_| WorkflowError::SessionPoisoned(id))?;
        Ok(f(&mut guard))
    }

    /// Run one orchestrator turn for a stored session
    pub fn advance(
        &self,
        id: Uuid,
        orchestrator: &WorkflowOrchestrator,
    ) -> Result<TurnReport, WorkflowError> {
        self.with_session(id, |state| orchestrator.advance(state))?
    }

    /// Copy of the session's current state
    pub fn get(&self, id: Uuid) -> Result<SessionState, WorkflowError> {
        self.with_session(id, |state| state.clone())
    }

    pub fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, WorkflowError> {
        self.with_session(id, |state| SessionSnapshot::capture(state))?
    }

    /// Validate and load a snapshot; returns the restored session's id
    pub fn restore(&self, snapshot: SessionSnapshot) -> Result<Uuid, WorkflowError> {
        let state = snapshot.restore()?;
        self.insert(state)
    }

    /// Drop a session, returning its final state
    pub fn remove(&self, id: Uuid) -> Result<Option<SessionState>, WorkflowError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| WorkflowError::SessionPoisoned(id))?
            .remove(&id);

        match removed {
            Some(session) => {
                let state = session
                    .lock()
                    .map_err(|_| WorkflowError::SessionPoisoned(id))?
                    .clone();
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Number of stored sessions
    ///
    /// The session map is only changed by single inserts and removes, so it
    /// is still consistent after a panic elsewhere poisoned its lock.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handle(&self, id: Uuid) -> Result<Arc<Mutex<SessionState>>, WorkflowError> {
        self.sessions
            .read()
            .map_err(|_| WorkflowError::SessionPoisoned(id))?
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::SessionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn test_len_counts_sessions_after_map_lock_is_poisoned() {
        let store = SessionStore::new();
        store.create().unwrap();
        store.create().unwrap();

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = store.sessions.write().unwrap();
            panic!("turn panicked while holding the session map");
        }));
        assert!(result.is_err());
        assert!(store.sessions.is_poisoned());

        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
