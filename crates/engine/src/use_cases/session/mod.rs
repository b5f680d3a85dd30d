//! Session use cases.
//!
//! Orchestrates the connection-facing flows of a live session: joining,
//! moving, resetting and leaving. Every flow except join runs against a
//! session the caller has already locked.

use std::sync::Arc;

mod join;
mod leave;
mod lifecycle;
mod play_move;
mod reset;

#[cfg(test)]
pub(crate) mod test_support;

pub use join::{JoinInput, JoinKind, JoinResult, JoinSession, SessionMode};
pub use leave::LeaveSession;
pub use lifecycle::SessionLifecycle;
pub use play_move::PlayMove;
pub use reset::ResetSession;

use crate::stores::SessionRegistry;

/// Container for session use cases.
pub struct SessionUseCases {
    pub join: Arc<JoinSession>,
    pub play_move: Arc<PlayMove>,
    pub reset: Arc<ResetSession>,
    pub leave: Arc<LeaveSession>,
}

impl SessionUseCases {
    pub fn new(registry: Arc<SessionRegistry>, lifecycle: Arc<SessionLifecycle>) -> Self {
        Self {
            join: Arc::new(JoinSession::new(registry, lifecycle.clone())),
            play_move: Arc::new(PlayMove::new(lifecycle.clone())),
            reset: Arc::new(ResetSession::new(lifecycle.clone())),
            leave: Arc::new(LeaveSession::new(lifecycle)),
        }
    }
}
