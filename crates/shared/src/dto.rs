//! Wire DTOs.
//!
//! Field names follow the browser client's camelCase convention. Snapshots
//! are built from the session aggregate and never carry transport state.

use std::collections::BTreeMap;

use fourinrow_domain::{FinishReason, Participant, Session, SessionStatus, COLS, ROWS};
use serde::{Deserialize, Serialize};

/// Full state of a session as every participant sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    /// Row 0 is the top row; 0 = empty, 1/2 = side color
    pub board: [[u8; COLS]; ROWS],
    pub players: BTreeMap<String, ParticipantView>,
    /// Empty while waiting for a second participant
    #[serde(default)]
    pub current_turn: String,
    pub status: SessionStatus,
    /// Winner key or `draw`; omitted until finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: String,
    pub username: String,
    pub color: u8,
    pub is_bot: bool,
    pub is_connected: bool,
}

impl From<&Participant> for ParticipantView {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id().to_string(),
            username: participant.username().to_string(),
            color: participant.side().color(),
            is_bot: participant.is_automated(),
            is_connected: participant.is_connected(),
        }
    }
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            board: session.board().to_colors(),
            players: session
                .participants()
                .iter()
                .map(|p| (p.id().to_string(), ParticipantView::from(p)))
                .collect(),
            current_turn: session
                .current_turn()
                .map(ToString::to_string)
                .unwrap_or_default(),
            status: session.status(),
            winner: session.winner().map(ToString::to_string),
        }
    }
}

/// Terminal notification sent once a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverPayload {
    pub winner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FinishReason>,
}

impl GameOverPayload {
    /// `None` while the session is still undecided.
    pub fn from_session(session: &Session) -> Option<Self> {
        session.winner().map(|winner| Self {
            winner: winner.to_string(),
            reason: session.finish_reason(),
        })
    }
}

/// One leaderboard row: an identity and its number of wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub identity: String,
    pub win_count: u64,
}
