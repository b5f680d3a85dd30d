//! External service port traits.

use fourinrow_domain::GameEvent;

/// Fire-and-forget sink for session telemetry.
///
/// Called while the session lock is held, so implementations must not block.
/// Delivery failures are the implementation's problem and never reach players.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetryPort: Send + Sync {
    fn emit(&self, event: GameEvent);
}
