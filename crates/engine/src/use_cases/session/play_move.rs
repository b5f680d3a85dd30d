use std::sync::Arc;

use fourinrow_domain::{GameError, ParticipantKey};

use super::lifecycle::SessionLifecycle;
use crate::stores::LiveSession;

/// Use case for a human move, followed by the automated reply when the
/// automated participant takes the turn.
pub struct PlayMove {
    lifecycle: Arc<SessionLifecycle>,
}

impl PlayMove {
    pub fn new(lifecycle: Arc<SessionLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Runs under the session lock. A rejected move leaves the session and
    /// everyone else's view untouched.
    pub fn execute(
        &self,
        live: &mut LiveSession,
        participant: &ParticipantKey,
        column: i64,
    ) -> Result<(), GameError> {
        let outcome = live
            .session_mut()
            .apply_move(participant, column)
            .map_err(|e| {
                if e.is_move_rejection() {
                    tracing::debug!(
                        session_id = %live.session().id(),
                        participant_id = %participant,
                        column,
                        error = %e,
                        "Move rejected"
                    );
                } else {
                    tracing::warn!(
                        session_id = %live.session().id(),
                        participant_id = %participant,
                        column,
                        error = %e,
                        "Move failed outside the rules"
                    );
                }
                e
            })?;
        self.lifecycle.record_move(live, participant, &outcome, false);
        self.lifecycle.play_automated(live)
    }
}
