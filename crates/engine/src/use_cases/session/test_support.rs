use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use fourinrow_domain::GameEvent;
use fourinrow_shared::ServerMessage;
use tokio::sync::mpsc;

use super::lifecycle::SessionLifecycle;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::ports::{GameRepo, TelemetryPort};

/// Telemetry sink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub(crate) struct RecordedEvents {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl RecordedEvents {
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let guard = self.events.lock().unwrap();
        guard.iter().map(|e| e.kind.name()).collect()
    }
}

impl RecordedEvents {
    pub(crate) fn timestamps(&self) -> Vec<DateTime<Utc>> {
        let guard = self.events.lock().unwrap();
        guard.iter().map(|e| e.timestamp).collect()
    }
}

impl TelemetryPort for RecordedEvents {
    fn emit(&self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// The instant every test lifecycle's clock reports.
pub(crate) fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

pub(crate) fn recording_telemetry() -> (Arc<dyn TelemetryPort>, RecordedEvents) {
    let events = RecordedEvents::default();
    (Arc::new(events.clone()), events)
}

pub(crate) fn lifecycle(
    telemetry: Arc<dyn TelemetryPort>,
    grace: Duration,
) -> Arc<SessionLifecycle> {
    Arc::new(SessionLifecycle::new(
        None,
        telemetry,
        Arc::new(FixedClock(test_now())),
        grace,
    ))
}

pub(crate) fn lifecycle_with_games(
    telemetry: Arc<dyn TelemetryPort>,
    games: Arc<dyn GameRepo>,
    grace: Duration,
) -> Arc<SessionLifecycle> {
    Arc::new(SessionLifecycle::new(
        Some(games),
        telemetry,
        Arc::new(FixedClock(test_now())),
        grace,
    ))
}

/// Everything queued on `rx` right now.
pub(crate) fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
