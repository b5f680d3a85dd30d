//! Four In A Row domain.
//!
//! Pure game state: the board and its rules, the deterministic opponent and
//! the session aggregate. Nothing here performs I/O or knows about
//! connections; the engine layers transport and timers on top.

pub mod board;
pub mod error;
pub mod events;
pub mod ids;
pub mod opponent;
pub mod session;

pub use board::{check_draw, check_win, Board, Cell, Side, COLS, CONNECT, ROWS};
pub use error::GameError;
pub use events::{GameEvent, GameEventKind};
pub use ids::{ParticipantKey, SessionKey};
pub use opponent::{choose_move, CENTER_PREFERENCE};
pub use session::{
    FinishReason, MoveOutcome, Participant, Session, SessionStatus, Winner,
    AUTOMATED_OPPONENT_KEY, AUTOMATED_OPPONENT_NAME, DRAW,
};
