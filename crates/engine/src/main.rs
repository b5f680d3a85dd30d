//! Four In A Row Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fourinrow_engine::{
    api,
    infrastructure::{
        clock::SystemClock, games::SqliteGameRepo, ports::GameRepo, settings::EngineSettings,
        telemetry::LogTelemetry,
    },
    App,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (Taskfile runs the engine from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fourinrow_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Four In A Row Engine");

    let settings = EngineSettings::from_env();

    // The archive is optional; live play never depends on it.
    let games: Option<Arc<dyn GameRepo>> = match settings.games_db.as_deref() {
        Some(path) => match SqliteGameRepo::new(path).await {
            Ok(repo) => {
                tracing::info!(path, "Finished-game archive opened");
                Some(Arc::new(repo))
            }
            Err(e) => {
                tracing::warn!(
                    path,
                    error = %e,
                    "Failed to open finished-game archive, continuing without persistence"
                );
                None
            }
        },
        None => {
            tracing::info!("GAMES_DB is empty, running without persistence");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    tracing::info!(
        grace_secs = settings.disconnect_grace.as_secs_f64(),
        allow_anonymous = settings.allow_anonymous,
        client_dir = %settings.client_dir.display(),
        "Engine configured"
    );

    let app = Arc::new(App::new(
        settings,
        games,
        Arc::new(LogTelemetry::new()),
        Arc::new(SystemClock::new()),
    ));

    let mut router = api::router(app);
    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(cors.allow_origin(origins))
}
