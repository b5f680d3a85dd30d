//! WebSocket frames exchanged between the engine and browser clients.
//!
//! Every frame is a JSON object `{ "type": ..., "payload": ... }`.
//!
//! ## Decoding policy
//!
//! - A frame that is not a JSON object with a string `type` is malformed
//! - A known `type` whose payload does not fit is an invalid payload
//! - Unknown types decode to [`ClientMessage::Unknown`] and are ignored

use serde::{Deserialize, Serialize};

use crate::dto::{GameOverPayload, SessionSnapshot};

// =============================================================================
// Client Messages (browser → engine)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Drop a piece into `column`
    Move { column: i64 },
    /// Clear the board and start over
    Reset,
    /// Any frame type this engine does not understand
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct MovePayload {
    column: i64,
}

impl ClientMessage {
    /// Decode one inbound text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        match envelope.kind.as_str() {
            "move" => {
                let payload: MovePayload = serde_json::from_value(envelope.payload).map_err(|e| {
                    ProtocolError::InvalidPayload {
                        kind: "move",
                        reason: e.to_string(),
                    }
                })?;
                Ok(Self::Move {
                    column: payload.column,
                })
            }
            "reset" => Ok(Self::Reset),
            _ => Ok(Self::Unknown),
        }
    }
}

// =============================================================================
// Server Messages (engine → browser)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full session snapshot, never a diff
    Update(SessionSnapshot),
    /// The session reached a terminal state
    GameOver(GameOverPayload),
    /// A request from this connection was rejected
    Error(String),
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        Self::Error(message.to_string())
    }
}
