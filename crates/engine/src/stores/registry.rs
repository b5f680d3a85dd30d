//! Session registry - the single source of truth for which sessions exist.
//!
//! The registry lock only guards the key -> handle map. Session internals are
//! guarded by each handle's own lock, so two connections that look up the
//! same key share one mutable session.

use std::collections::HashMap;

use fourinrow_domain::{GameError, Session, SessionKey};
use tokio::sync::RwLock;

use super::session::{LiveSession, SessionHandle};

pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionKey, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register `session`, replacing any live session under the same key.
    pub async fn add(&self, session: Session) -> SessionHandle {
        let key = session.id().clone();
        let handle = LiveSession::into_handle(session);
        let mut sessions = self.sessions.write().await;
        if sessions.insert(key.clone(), handle.clone()).is_some() {
            tracing::debug!(session_id = %key, "Session replaced in registry");
        } else {
            tracing::debug!(session_id = %key, "Session added to registry");
        }
        handle
    }

    pub async fn get(&self, key: &SessionKey) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(key).cloned()
    }

    pub async fn remove(&self, key: &SessionKey) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(key);
        if removed.is_some() {
            tracing::debug!(session_id = %key, "Session removed from registry");
        }
        removed
    }

    /// Look up `key`, creating the session with `create` when absent.
    ///
    /// Returns the handle and whether this call created it. Creation happens
    /// under the write lock so two racing joins cannot both create.
    pub async fn get_or_insert_with<F>(
        &self,
        key: &SessionKey,
        create: F,
    ) -> Result<(SessionHandle, bool), GameError>
    where
        F: FnOnce() -> Result<Session, GameError>,
    {
        if let Some(handle) = self.get(key).await {
            return Ok((handle, false));
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(key) {
            return Ok((handle.clone(), false));
        }
        let handle = LiveSession::into_handle(create()?);
        sessions.insert(key.clone(), handle.clone());
        tracing::debug!(session_id = %key, "Session created");
        Ok((handle, true))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
