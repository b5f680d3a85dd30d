use std::sync::Arc;

use fourinrow_domain::{GameError, ParticipantKey};

use super::lifecycle::SessionLifecycle;
use crate::stores::LiveSession;

/// Use case for clearing the board and starting over in place.
pub struct ResetSession {
    lifecycle: Arc<SessionLifecycle>,
}

impl ResetSession {
    pub fn new(lifecycle: Arc<SessionLifecycle>) -> Self {
        Self { lifecycle }
    }

    pub fn execute(
        &self,
        live: &mut LiveSession,
        participant: &ParticipantKey,
    ) -> Result<(), GameError> {
        live.session_mut().reset()?;
        live.cancel_all_forfeits();
        tracing::info!(
            session_id = %live.session().id(),
            participant_id = %participant,
            "Session reset"
        );
        self.lifecycle.emit_started(live.session());
        live.broadcast_snapshot();
        self.lifecycle.arm_absent(live);
        self.lifecycle.play_automated(live)
    }
}
