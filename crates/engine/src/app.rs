//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    ports::{ClockPort, GameRepo, TelemetryPort},
    settings::EngineSettings,
};
use crate::stores::SessionRegistry;
use crate::use_cases::{session::SessionLifecycle, SessionUseCases};

/// Main application state.
///
/// Holds the registry, the use cases and the collaborators.
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub registry: Arc<SessionRegistry>,
    pub use_cases: UseCases,
    /// `None` when persistence is disabled
    pub games: Option<Arc<dyn GameRepo>>,
    pub settings: EngineSettings,
}

/// Container for all use cases.
pub struct UseCases {
    pub session: SessionUseCases,
}

impl App {
    pub fn new(
        settings: EngineSettings,
        games: Option<Arc<dyn GameRepo>>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let lifecycle = Arc::new(SessionLifecycle::new(
            games.clone(),
            telemetry,
            clock,
            settings.disconnect_grace,
        ));

        Self {
            use_cases: UseCases {
                session: SessionUseCases::new(registry.clone(), lifecycle),
            },
            registry,
            games,
            settings,
        }
    }
}
