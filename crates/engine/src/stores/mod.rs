//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `SessionRegistry` - key -> live session map
//! - `LiveSession` - one session plus its connection handles and forfeiture timers

pub mod registry;
pub mod session;

// Re-export store types
pub use registry::SessionRegistry;
pub use session::{LiveSession, SessionHandle};
