//! SQLite-backed storage for finished games.

use async_trait::async_trait;
use fourinrow_domain::DRAW;
use fourinrow_shared::LeaderboardEntry;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{GameRecord, GameRepo, RepoError};

/// SQLite implementation of the finished-game archive and leaderboard.
pub struct SqliteGameRepo {
    pool: SqlitePool,
}

impl SqliteGameRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("games", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                game_id TEXT PRIMARY KEY,
                player1 TEXT NOT NULL,
                player2 TEXT NOT NULL,
                winner TEXT NOT NULL,
                created_at TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("games", e))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl GameRepo for SqliteGameRepo {
    async fn save_finished(&self, record: &GameRecord) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO games (game_id, player1, player2, winner, created_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(game_id) DO UPDATE SET
                player1 = excluded.player1,
                player2 = excluded.player2,
                winner = excluded.winner,
                finished_at = excluded.finished_at
            "#,
        )
        .bind(&record.session_id)
        .bind(&record.player1)
        .bind(&record.player2)
        .bind(&record.winner)
        .bind(record.created_at.to_rfc3339())
        .bind(record.finished_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("save_finished", e))?;

        tracing::debug!(
            session_id = %record.session_id,
            winner = %record.winner,
            "Finished game stored"
        );
        Ok(())
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT winner, COUNT(*) AS wins
            FROM games
            WHERE winner != ?
            GROUP BY winner
            ORDER BY wins DESC, winner ASC
            "#,
        )
        .bind(DRAW)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("leaderboard", e))?;

        rows.into_iter()
            .map(|row| {
                let wins: i64 = row.get("wins");
                Ok(LeaderboardEntry {
                    identity: row.get("winner"),
                    win_count: u64::try_from(wins).map_err(RepoError::serialization)?,
                })
            })
            .collect()
    }
}
