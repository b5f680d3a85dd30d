//! HTTP routes.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use fourinrow_shared::LeaderboardEntry;

use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/leaderboard", get(leaderboard))
}

async fn health() -> &'static str {
    "OK"
}

async fn leaderboard(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let games = app
        .games
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("leaderboard storage is not configured".into()))?;
    let entries = games.leaderboard().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to load leaderboard");
        ApiError::from(e)
    })?;
    Ok(Json(entries))
}

#[derive(Debug)]
pub enum ApiError {
    Unavailable(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Unavailable(msg) => {
                (axum::http::StatusCode::SERVICE_UNAVAILABLE, msg).into_response()
            }
            ApiError::Internal(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
            )
                .into_response(),
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
