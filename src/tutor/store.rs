//! In-memory session store
//!
//! Owns every [`Session`] keyed by its id. The store knows nothing about
//! completion providers; it only creates, mutates and snapshots sessions.
//! Lifetime is tied to the owning [`crate::tutor::TutorService`]; nothing is
//! persisted.

use crate::error::{Result, TutorError};
use crate::tutor::session::{Message, Session, Stage};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Mapping from session id to session state
///
/// All accessors take `&self`; the map sits behind an `RwLock` so a store can
/// be shared across tasks. Readers get snapshot copies, never references into
/// stored state.
///
/// # Examples
///
/// ```
/// use essay_tutor::tutor::{Message, SessionStore};
///
/// let store = SessionStore::new();
/// store.create("s1");
/// store.append("s1", Message::user("hello")).unwrap();
/// assert_eq!(store.history("s1").len(), 1);
/// assert!(store.append("missing", Message::user("x")).is_err());
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh empty session for `id`
    ///
    /// Any existing session under the same id is discarded along with its
    /// history. Returns a snapshot of the new session.
    pub fn create(&self, id: &str) -> Session {
        let session = Session::new(id);
        if self
            .write()
            .insert(id.to_string(), session.clone())
            .is_some()
        {
            tracing::debug!(session_id = %id, "Replaced existing session on create");
        }
        session
    }

    /// Looks up a session snapshot by id
    pub fn get(&self, id: &str) -> Option<Session> {
        self.read().get(id).cloned()
    }

    /// Returns true when a session exists for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Appends a message to the session's log
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownSession` if no session exists for `id`
    pub fn append(&self, id: &str, message: Message) -> Result<()> {
        self.with_session_mut(id, |session| session.push(message))
    }

    /// Replaces a known session with a fresh empty one under the same id
    ///
    /// Returns false, without creating anything, when `id` is unknown.
    pub fn reset(&self, id: &str) -> bool {
        let mut sessions = self.write();
        match sessions.get_mut(id) {
            Some(session) => {
                *session = Session::new(id);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the session's messages in append order
    ///
    /// Unknown ids yield an empty history.
    pub fn history(&self, id: &str) -> Vec<Message> {
        self.read()
            .get(id)
            .map(|session| session.messages().to_vec())
            .unwrap_or_default()
    }

    /// Sets or clears the session topic
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownSession` if no session exists for `id`
    pub fn set_topic(&self, id: &str, topic: Option<String>) -> Result<()> {
        self.with_session_mut(id, |session| session.set_topic(topic))
    }

    /// Sets the session workflow stage
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownSession` if no session exists for `id`
    pub fn set_stage(&self, id: &str, stage: Stage) -> Result<()> {
        self.with_session_mut(id, |session| session.set_stage(stage))
    }

    /// Number of sessions held
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn with_session_mut(&self, id: &str, f: impl FnOnce(&mut Session)) -> Result<()> {
        let mut sessions = self.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| TutorError::UnknownSession(id.to_string()))?;
        f(session);
        Ok(())
    }

    // A panic while holding the lock cannot leave a session half-written:
    // every mutation is a single push or field assignment.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
