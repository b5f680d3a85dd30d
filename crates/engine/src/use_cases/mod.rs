//! Use cases - User story orchestration.
//!
//! Use cases drive the domain session and report the results to the
//! connected participants and the collaborators.

pub mod session;

// Re-export main types
pub use session::SessionUseCases;
