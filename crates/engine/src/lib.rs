//! Four In A Row engine library.
//!
//! Server side of the game: live sessions, the WebSocket protocol driver,
//! forfeit timers and the finished-game archive.
//!
//! ## Structure
//!
//! - `stores/` - in-memory session registry and per-session connection state
//! - `use_cases/` - join, move, reset and leave orchestration
//! - `infrastructure/` - external dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
