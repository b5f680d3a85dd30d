//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Finished-game storage and the leaderboard (could swap SQLite -> Postgres)
//! - Telemetry (could swap tracing -> a message broker)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{GameRecord, GameRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::TelemetryPort;

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Errors
// =============================================================================
pub use error::RepoError;

#[cfg(test)]
pub use external::MockTelemetryPort;
#[cfg(test)]
pub use repos::MockGameRepo;
#[cfg(test)]
pub use testing::MockClockPort;
