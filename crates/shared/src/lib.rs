//! Four In A Row wire contract shared by the engine and its clients.
//!
//! - `messages` - inbound and outbound WebSocket frames
//! - `dto` - session snapshots, game-over payloads, leaderboard rows
//!
//! No business logic lives here; snapshots are projections of the domain
//! session aggregate.

pub mod dto;
pub mod messages;

pub use dto::{GameOverPayload, LeaderboardEntry, ParticipantView, SessionSnapshot};
pub use messages::{ClientMessage, ProtocolError, ServerMessage};
