//! Session aggregate - one game between two participants.
//!
//! # Invariants
//!
//! - At most two participants, one per [`Side`]
//! - While `Playing`, `current_turn` names a seated participant
//! - Once `Finished`, `winner` is set and no move is accepted until `reset`
//! - Pieces are never removed except by `reset`

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{check_draw, check_win, Board, Side, COLS};
use crate::error::GameError;
use crate::ids::{ParticipantKey, SessionKey};

/// Key the automated opponent is seated under.
pub const AUTOMATED_OPPONENT_KEY: &str = "cpu";

/// Display name of the automated opponent.
pub const AUTOMATED_OPPONENT_NAME: &str = "Bot";

/// Sentinel recorded as winner when the board fills up.
pub const DRAW: &str = "draw";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Resolved result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    Participant(ParticipantKey),
    Draw,
}

impl Winner {
    /// Participant key, or the draw sentinel.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Participant(key) => key.as_str(),
            Self::Draw => DRAW,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Four in a line
    Connect,
    /// Board filled without a line
    Draw,
    /// A participant stayed disconnected past the grace period
    Forfeit,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Draw => write!(f, "draw"),
            Self::Forfeit => write!(f, "forfeit"),
        }
    }
}

/// One side of a session, human or automated.
///
/// The transport handle is not part of the participant; the engine keeps it
/// in a side table so it can never leak into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantKey,
    username: String,
    side: Side,
    automated: bool,
    connected: bool,
}

impl Participant {
    pub fn id(&self) -> &ParticipantKey {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_automated(&self) -> bool {
        self.automated
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub row: usize,
    pub column: usize,
    pub side: Side,
    /// Set when this move ended the game
    pub finish: Option<FinishReason>,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: SessionKey,
    board: Board,
    participants: Vec<Participant>,
    current_turn: Option<ParticipantKey>,
    status: SessionStatus,
    winner: Option<Winner>,
    finish_reason: Option<FinishReason>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// An empty session waiting for participants.
    pub fn new(id: SessionKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            board: Board::new(),
            participants: Vec::with_capacity(2),
            current_turn: None,
            status: SessionStatus::Waiting,
            winner: None,
            finish_reason: None,
            created_at,
        }
    }

    /// A session with `human` on side one already paired against the
    /// automated opponent. The human moves first.
    pub fn against_automated(
        id: SessionKey,
        human: ParticipantKey,
        username: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let mut session = Self::new(id, created_at);
        session.seat(human, username, false)?;
        session.seat(
            ParticipantKey::new(AUTOMATED_OPPONENT_KEY),
            AUTOMATED_OPPONENT_NAME,
            true,
        )?;
        Ok(session)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &SessionKey {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Participants ordered by side.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, key: &ParticipantKey) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == key)
    }

    /// The other participant, if both seats are bound.
    pub fn opponent_of(&self, key: &ParticipantKey) -> Option<&Participant> {
        if self.participant(key).is_none() {
            return None;
        }
        self.participants.iter().find(|p| &p.id != key)
    }

    pub fn current_turn(&self) -> Option<&ParticipantKey> {
        self.current_turn.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() == 2
    }

    /// The automated participant, when it holds the turn of a live game.
    pub fn automated_to_move(&self) -> Option<&Participant> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        let key = self.current_turn.as_ref()?;
        self.participant(key).filter(|p| p.automated)
    }

    /// Side one always opens.
    pub fn starting_turn(&self) -> Option<&ParticipantKey> {
        self.participants
            .iter()
            .find(|p| p.side == Side::One)
            .map(|p| &p.id)
    }

    // =========================================================================
    // Seating and connectivity
    // =========================================================================

    /// Bind `key` to the next free side. Binding the second side starts the
    /// game with side one to move.
    pub fn seat(
        &mut self,
        key: ParticipantKey,
        username: impl Into<String>,
        automated: bool,
    ) -> Result<Side, GameError> {
        if self.participant(&key).is_some() {
            return Err(GameError::AlreadySeated(key.into_string()));
        }
        let side = match self.participants.first() {
            None => Side::One,
            Some(first) if !self.is_full() => first.side.opponent(),
            Some(_) => return Err(GameError::SessionFull),
        };

        self.participants.push(Participant {
            id: key,
            username: username.into(),
            side,
            automated,
            connected: true,
        });
        self.participants.sort_by_key(|p| p.side.color());

        if self.is_full() {
            self.start();
        }
        Ok(side)
    }

    /// Record a connectivity change. Returns false for unknown keys.
    pub fn set_connected(&mut self, key: &ParticipantKey, connected: bool) -> bool {
        match self.participants.iter_mut().find(|p| &p.id == key) {
            Some(participant) => {
                participant.connected = connected;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Validate and apply `participant`'s move into `column`.
    ///
    /// Checks run in order: session is playing, it is the participant's turn,
    /// the column is on the board, the column has room. A rejected move
    /// leaves the session untouched.
    pub fn apply_move(
        &mut self,
        participant: &ParticipantKey,
        column: i64,
    ) -> Result<MoveOutcome, GameError> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::GameNotActive);
        }
        if self.current_turn.as_ref() != Some(participant) {
            return Err(GameError::OutOfTurn);
        }
        let column = usize::try_from(column)
            .ok()
            .filter(|&col| col < COLS)
            .ok_or(GameError::InvalidColumn)?;
        let side = self
            .participant(participant)
            .map(|p| p.side)
            .ok_or(GameError::OutOfTurn)?;

        let row = self.board.drop_piece(column, side)?;

        let finish = if check_win(&self.board, row, column, side) {
            self.finish(Winner::Participant(participant.clone()), FinishReason::Connect);
            Some(FinishReason::Connect)
        } else if check_draw(&self.board) {
            self.finish(Winner::Draw, FinishReason::Draw);
            Some(FinishReason::Draw)
        } else {
            self.current_turn = self.opponent_of(participant).map(|p| p.id.clone());
            None
        };

        Ok(MoveOutcome {
            row,
            column,
            side,
            finish,
        })
    }

    /// End a live game in favour of `loser`'s opponent. Returns the winner's
    /// key, or `None` when the session was not playing.
    pub fn forfeit(&mut self, loser: &ParticipantKey) -> Option<ParticipantKey> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        let winner = self.opponent_of(loser)?.id.clone();
        self.finish(Winner::Participant(winner.clone()), FinishReason::Forfeit);
        Some(winner)
    }

    /// Clear the board and restart from the original opening turn.
    pub fn reset(&mut self) -> Result<(), GameError> {
        if !self.is_full() {
            return Err(GameError::GameNotActive);
        }
        self.board = Board::new();
        self.start();
        Ok(())
    }

    fn start(&mut self) {
        self.status = SessionStatus::Playing;
        self.current_turn = self.starting_turn().cloned();
        self.winner = None;
        self.finish_reason = None;
    }

    fn finish(&mut self, winner: Winner, reason: FinishReason) {
        self.status = SessionStatus::Finished;
        self.winner = Some(winner);
        self.finish_reason = Some(reason);
    }
}
