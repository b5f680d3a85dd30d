use std::sync::Arc;

use fourinrow_domain::{GameEventKind, ParticipantKey, SessionStatus};
use uuid::Uuid;

use super::lifecycle::SessionLifecycle;
use crate::stores::LiveSession;

/// Use case for a closed or failed connection.
pub struct LeaveSession {
    lifecycle: Arc<SessionLifecycle>,
}

impl LeaveSession {
    pub fn new(lifecycle: Arc<SessionLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Mark `participant` away and start the grace period. A connection that
    /// was already superseded by a reconnect changes nothing.
    pub fn execute(&self, live: &mut LiveSession, participant: &ParticipantKey, connection_id: Uuid) {
        if !live.unbind(participant, connection_id) {
            tracing::debug!(
                session_id = %live.session().id(),
                participant_id = %participant,
                connection_id = %connection_id,
                "Stale connection closed, participant still bound elsewhere"
            );
            return;
        }

        live.session_mut().set_connected(participant, false);
        tracing::info!(
            session_id = %live.session().id(),
            participant_id = %participant,
            connection_id = %connection_id,
            "Participant disconnected"
        );
        self.lifecycle.emit(
            live.session(),
            Some(participant),
            GameEventKind::ParticipantDisconnected,
        );
        live.broadcast_snapshot();

        if live.session().status() == SessionStatus::Playing {
            self.lifecycle.arm_forfeit(live, participant);
        }
    }
}
