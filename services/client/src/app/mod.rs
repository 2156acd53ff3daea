//! services/client/src/app/mod.rs
//!
//! Application services: session, autosave, leaderboard cache, connectivity
//! probe and the controller that wires them together.

pub mod autosave;
pub mod controller;
pub mod game;
pub mod leaderboard;
pub mod notify;
pub mod probe;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::AppController;
pub use state::AppState;
