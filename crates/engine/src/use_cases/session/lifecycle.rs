//! Side effects shared by every session use case: telemetry, game-over
//! handoff, forfeiture timers and the automated opponent's replies.

use std::sync::Arc;
use std::time::Duration;

use fourinrow_domain::{
    choose_move, GameError, GameEvent, GameEventKind, MoveOutcome, ParticipantKey, Session,
    SessionStatus,
};
use fourinrow_shared::{GameOverPayload, ServerMessage};

use crate::infrastructure::ports::{ClockPort, GameRecord, GameRepo, TelemetryPort};
use crate::stores::LiveSession;

pub struct SessionLifecycle {
    games: Option<Arc<dyn GameRepo>>,
    telemetry: Arc<dyn TelemetryPort>,
    clock: Arc<dyn ClockPort>,
    grace: Duration,
}

impl SessionLifecycle {
    pub fn new(
        games: Option<Arc<dyn GameRepo>>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Arc<dyn ClockPort>,
        grace: Duration,
    ) -> Self {
        Self {
            games,
            telemetry,
            clock,
            grace,
        }
    }

    pub fn clock(&self) -> &dyn ClockPort {
        self.clock.as_ref()
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub(crate) fn emit(
        &self,
        session: &Session,
        participant: Option<&ParticipantKey>,
        kind: GameEventKind,
    ) {
        self.telemetry.emit(GameEvent::new(
            session.id().clone(),
            participant.cloned(),
            self.clock.now(),
            kind,
        ));
    }

    pub(crate) fn emit_started(&self, session: &Session) {
        let automated_opponent = session.participants().iter().any(|p| p.is_automated());
        tracing::info!(
            session_id = %session.id(),
            automated_opponent,
            "Session started"
        );
        self.emit(
            session,
            None,
            GameEventKind::SessionStarted { automated_opponent },
        );
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Report an applied move: telemetry, a fresh snapshot to everyone and,
    /// if the move ended the game, the game-over handoff.
    pub(crate) fn record_move(
        &self,
        live: &mut LiveSession,
        mover: &ParticipantKey,
        outcome: &MoveOutcome,
        automated: bool,
    ) {
        tracing::debug!(
            session_id = %live.session().id(),
            participant_id = %mover,
            column = outcome.column,
            row = outcome.row,
            automated,
            "Move applied"
        );
        self.emit(
            live.session(),
            Some(mover),
            GameEventKind::MovePlayed {
                column: outcome.column,
                row: outcome.row,
                side: outcome.side,
                automated,
            },
        );
        live.broadcast_snapshot();
        if outcome.finish.is_some() {
            self.conclude(live);
        }
    }

    /// Let the automated participant move for as long as it holds the turn.
    ///
    /// Runs under the caller's session lock, so nobody observes the automated
    /// side holding the turn between the triggering move and its reply.
    pub(crate) fn play_automated(&self, live: &mut LiveSession) -> Result<(), GameError> {
        while let Some((key, side)) = live
            .session()
            .automated_to_move()
            .map(|p| (p.id().clone(), p.side()))
        {
            let column = choose_move(live.session().board(), side).map_err(|e| {
                tracing::error!(
                    session_id = %live.session().id(),
                    error = %e,
                    "Automated opponent could not move"
                );
                e
            })?;
            let column = i64::try_from(column).map_err(|_| GameError::InvalidColumn)?;
            let outcome = live.session_mut().apply_move(&key, column)?;
            self.record_move(live, &key, &outcome, true);
        }
        Ok(())
    }

    // =========================================================================
    // Game over
    // =========================================================================

    /// Terminal handoff: stop timers, tell everyone, emit telemetry and
    /// archive the result off the mutation path.
    pub(crate) fn conclude(&self, live: &mut LiveSession) {
        let Some(payload) = GameOverPayload::from_session(live.session()) else {
            return;
        };
        live.cancel_all_forfeits();
        live.broadcast(&ServerMessage::GameOver(payload.clone()));

        let session = live.session();
        tracing::info!(
            session_id = %session.id(),
            winner = %payload.winner,
            reason = ?payload.reason,
            "Game over"
        );
        if let Some(reason) = session.finish_reason() {
            self.emit(
                session,
                None,
                GameEventKind::SessionCompleted {
                    winner: payload.winner,
                    reason,
                },
            );
        }
        self.persist(session);
    }

    fn persist(&self, session: &Session) {
        let Some(games) = self.games.clone() else {
            return;
        };
        let Some(record) = GameRecord::from_session(session, self.clock.now()) else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = games.save_finished(&record).await {
                tracing::warn!(
                    session_id = %record.session_id,
                    error = %e,
                    "Failed to persist finished game"
                );
            }
        });
    }

    // =========================================================================
    // Forfeiture
    // =========================================================================

    /// Start the grace period for `participant`, replacing any timer already
    /// armed for them.
    pub(crate) fn arm_forfeit(self: &Arc<Self>, live: &mut LiveSession, participant: &ParticipantKey) {
        live.cancel_forfeit(participant);
        let token = live.next_forfeit_token();
        let weak = live.downgrade();
        let lifecycle = Arc::clone(self);
        let key = participant.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(lifecycle.grace).await;
            let Some(handle) = weak.upgrade() else {
                return;
            };
            let mut live = handle.lock().await;
            if live.claim_forfeit(&key, token) {
                lifecycle.expire(&mut live, &key);
            }
        });
        live.install_forfeit(participant, token, task.abort_handle());

        tracing::info!(
            session_id = %live.session().id(),
            participant_id = %participant,
            grace_secs = self.grace.as_secs_f64(),
            "Forfeit timer armed"
        );
    }

    /// Arm timers for every human who is away while the session is live.
    pub(crate) fn arm_absent(self: &Arc<Self>, live: &mut LiveSession) {
        if live.session().status() != SessionStatus::Playing {
            return;
        }
        let absent: Vec<ParticipantKey> = live
            .session()
            .participants()
            .iter()
            .filter(|p| !p.is_automated() && !p.is_connected())
            .map(|p| p.id().clone())
            .collect();
        for participant in &absent {
            self.arm_forfeit(live, participant);
        }
    }

    /// The grace period ran out. Forfeit only if the participant is still away
    /// and the game is still on.
    fn expire(&self, live: &mut LiveSession, participant: &ParticipantKey) {
        let still_away = live
            .session()
            .participant(participant)
            .is_some_and(|p| !p.is_connected());
        if !still_away {
            return;
        }
        let Some(winner) = live.session_mut().forfeit(participant) else {
            return;
        };
        tracing::info!(
            session_id = %live.session().id(),
            participant_id = %participant,
            winner = %winner,
            "Participant forfeited after grace period"
        );
        live.broadcast_snapshot();
        self.conclude(live);
    }
}
