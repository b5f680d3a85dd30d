//! API layer - HTTP and WebSocket entry points.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::app::App;

pub mod http;
pub mod websocket;

/// The full router: HTTP routes, the protocol driver on `/ws`, and the
/// static client as fallback.
pub fn router(app: Arc<App>) -> Router {
    let client_dir = app.settings.client_dir.clone();
    http::routes()
        .route("/ws", get(websocket::ws_handler))
        .with_state(app)
        .fallback_service(ServeDir::new(client_dir))
        .layer(TraceLayer::new_for_http())
}
