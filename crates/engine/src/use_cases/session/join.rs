use std::sync::Arc;

use fourinrow_domain::{
    GameError, GameEventKind, ParticipantKey, Session, SessionKey, SessionStatus,
};
use fourinrow_shared::{GameOverPayload, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::lifecycle::SessionLifecycle;
use crate::stores::{SessionHandle, SessionRegistry};

/// How a session is seeded when this join creates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Paired immediately with the automated opponent
    #[default]
    Automated,
    /// Waits for a second human
    Pvp,
}

impl SessionMode {
    /// Accepts `bot` and `pvp`; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "bot" => Some(Self::Automated),
            "pvp" => Some(Self::Pvp),
            _ => None,
        }
    }
}

pub struct JoinInput {
    pub session_id: SessionKey,
    pub participant: ParticipantKey,
    pub username: String,
    pub mode: SessionMode,
    pub connection_id: Uuid,
    pub sender: mpsc::Sender<ServerMessage>,
    /// Fired if a later join for the same identity replaces this connection
    pub superseded: oneshot::Sender<()>,
}

/// How the participant ended up in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Created,
    Seated,
    Reconnected,
}

pub struct JoinResult {
    pub handle: SessionHandle,
    pub kind: JoinKind,
}

/// Use case for binding a connection to a session: create, seat or
/// reconnect, then bring every connected participant up to date.
pub struct JoinSession {
    registry: Arc<SessionRegistry>,
    lifecycle: Arc<SessionLifecycle>,
}

impl JoinSession {
    pub fn new(registry: Arc<SessionRegistry>, lifecycle: Arc<SessionLifecycle>) -> Self {
        Self {
            registry,
            lifecycle,
        }
    }

    pub async fn execute(&self, input: JoinInput) -> Result<JoinResult, GameError> {
        let JoinInput {
            session_id,
            participant,
            username,
            mode,
            connection_id,
            sender,
            superseded,
        } = input;

        let now = self.lifecycle.clock().now();
        let (handle, created) = self
            .registry
            .get_or_insert_with(&session_id, || match mode {
                SessionMode::Automated => Session::against_automated(
                    session_id.clone(),
                    participant.clone(),
                    username.clone(),
                    now,
                ),
                SessionMode::Pvp => {
                    let mut session = Session::new(session_id.clone(), now);
                    session.seat(participant.clone(), username.clone(), false)?;
                    Ok(session)
                }
            })
            .await?;

        let mut live = handle.lock().await;

        let kind = if created {
            if live.session().status() == SessionStatus::Playing {
                self.lifecycle.emit_started(live.session());
            }
            JoinKind::Created
        } else if live.session().participant(&participant).is_some() {
            live.session_mut().set_connected(&participant, true);
            if live.cancel_forfeit(&participant) {
                tracing::info!(
                    session_id = %session_id,
                    participant_id = %participant,
                    "Forfeit timer cancelled by reconnect"
                );
            }
            self.lifecycle.emit(
                live.session(),
                Some(&participant),
                GameEventKind::ParticipantReconnected,
            );
            JoinKind::Reconnected
        } else {
            live.session_mut()
                .seat(participant.clone(), username, false)?;
            if live.session().status() == SessionStatus::Playing {
                self.lifecycle.emit_started(live.session());
                self.lifecycle.arm_absent(&mut live);
            }
            JoinKind::Seated
        };

        live.bind(&participant, connection_id, sender, Some(superseded));
        tracing::info!(
            session_id = %session_id,
            participant_id = %participant,
            connection_id = %connection_id,
            kind = ?kind,
            status = %live.session().status(),
            "Participant joined session"
        );

        // Everyone, the joiner included, gets the full current state.
        live.broadcast_snapshot();
        if let Some(payload) = GameOverPayload::from_session(live.session()) {
            live.send_to(&participant, ServerMessage::GameOver(payload));
        }

        drop(live);
        Ok(JoinResult { handle, kind })
    }
}
