//! Repository port traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fourinrow_domain::Session;
use fourinrow_shared::LeaderboardEntry;

use super::error::RepoError;

/// Archived result of one finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub session_id: String,
    /// Side one identity
    pub player1: String,
    /// Side two identity
    pub player2: String,
    /// Winner identity or the draw sentinel
    pub winner: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl GameRecord {
    /// `None` unless the session is finished with both seats bound.
    pub fn from_session(session: &Session, finished_at: DateTime<Utc>) -> Option<Self> {
        if !session.is_finished() {
            return None;
        }
        let winner = session.winner()?.to_string();
        let mut seats = session.participants().iter().map(|p| p.id().to_string());
        let player1 = seats.next()?;
        let player2 = seats.next()?;

        Some(Self {
            session_id: session.id().to_string(),
            player1,
            player2,
            winner,
            created_at: session.created_at(),
            finished_at,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRepo: Send + Sync {
    /// Upsert keyed by session id. A reset session that finishes again
    /// overwrites its previous record.
    async fn save_finished(&self, record: &GameRecord) -> Result<(), RepoError>;

    /// Win counts per identity, draws excluded, most wins first.
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, RepoError>;
}
