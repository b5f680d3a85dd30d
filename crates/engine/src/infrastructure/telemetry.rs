//! Telemetry sink that writes events to the tracing subscriber.
//!
//! Stands in for an analytics producer: each event becomes one structured
//! log line with the JSON record attached.

use fourinrow_domain::GameEvent;

use crate::infrastructure::ports::TelemetryPort;

#[derive(Debug, Default)]
pub struct LogTelemetry;

impl LogTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for LogTelemetry {
    fn emit(&self, event: GameEvent) {
        match serde_json::to_string(&event) {
            Ok(record) => tracing::info!(
                target: "fourinrow_engine::telemetry",
                event = event.kind.name(),
                session_id = %event.session_id,
                record = %record,
                "Game event"
            ),
            Err(e) => tracing::warn!(
                event = event.kind.name(),
                session_id = %event.session_id,
                error = %e,
                "Failed to encode game event"
            ),
        }
    }
}
