//! Telemetry event records.
//!
//! Events are facts about a session handed to the telemetry collaborator.
//! They carry no behaviour and nothing in the game reads them back.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Side;
use crate::ids::{ParticipantKey, SessionKey};
use crate::session::FinishReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameEventKind {
    SessionStarted {
        automated_opponent: bool,
    },
    MovePlayed {
        column: usize,
        row: usize,
        side: Side,
        automated: bool,
    },
    SessionCompleted {
        /// Winner key or the draw sentinel
        winner: String,
        reason: FinishReason,
    },
    ParticipantDisconnected,
    ParticipantReconnected,
}

impl GameEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::MovePlayed { .. } => "move_played",
            Self::SessionCompleted { .. } => "session_completed",
            Self::ParticipantDisconnected => "participant_disconnected",
            Self::ParticipantReconnected => "participant_reconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEvent {
    pub session_id: SessionKey,
    pub participant_id: Option<ParticipantKey>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: GameEventKind,
}

impl GameEvent {
    pub fn new(
        session_id: SessionKey,
        participant_id: Option<ParticipantKey>,
        timestamp: DateTime<Utc>,
        kind: GameEventKind,
    ) -> Self {
        Self {
            session_id,
            participant_id,
            timestamp,
            kind,
        }
    }
}
