//! Game error taxonomy.
//!
//! Every variant's display text is what the offending connection sees in its
//! `error` frame, so keep them short and player-readable.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The session is waiting for a second participant or already finished
    #[error("game is not active")]
    GameNotActive,

    /// Someone other than `current_turn` tried to move
    #[error("not your turn")]
    OutOfTurn,

    /// Column index outside `0..COLS`
    #[error("invalid column")]
    InvalidColumn,

    /// The column's top cell is occupied
    #[error("column full")]
    ColumnFull,

    /// A recognised frame whose payload does not fit; holds the frame type
    #[error("invalid {0} payload")]
    InvalidPayload(String),

    /// The opponent strategy was asked to move on a full board
    #[error("no valid moves")]
    NoValidMoves,

    /// Both seats are bound and the joining identity is neither of them
    #[error("session is full")]
    SessionFull,

    /// A participant key was seated twice
    #[error("participant already seated: {0}")]
    AlreadySeated(String),
}

impl GameError {
    pub fn invalid_payload(kind: impl Into<String>) -> Self {
        Self::InvalidPayload(kind.into())
    }

    /// Rule violations a player can trigger with a well-formed move.
    pub fn is_move_rejection(&self) -> bool {
        matches!(
            self,
            Self::GameNotActive | Self::OutOfTurn | Self::InvalidColumn | Self::ColumnFull
        )
    }
}
