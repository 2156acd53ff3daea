//! crates/finance_empire_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core talks through.
//! These traits keep the session, cache and autosave logic independent of the
//! concrete HTTP client, storage backend and time source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuthPayload, GameData, LeaderboardEntry, LoginRequest, RegisterRequest, User, UserPosition,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Failure of a port operation.
///
/// Transport problems (the server could not be reached) are kept apart from
/// application rejections (the server answered with a non-success status).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl PortError {
    /// True for a 401 answer, i.e. the bearer token is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Rejected { status: 401, .. })
    }

    /// True when the server produced a response, whatever its status.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PortError::Rejected { .. })
    }

    /// The server-supplied error message, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote Finance Empire API.
#[async_trait]
pub trait GameApiService: Send + Sync {
    // --- Authentication ---
    async fn register(&self, request: &RegisterRequest) -> PortResult<AuthPayload>;

    async fn login(&self, request: &LoginRequest) -> PortResult<AuthPayload>;

    /// Fetches the profile (including saved game data) behind a token.
    async fn fetch_user(&self, token: &str) -> PortResult<User>;

    // --- Progress ---
    async fn save_game(&self, token: &str, game_data: &GameData) -> PortResult<()>;

    // --- Leaderboard ---
    async fn leaderboard(&self, limit: usize) -> PortResult<Vec<LeaderboardEntry>>;

    /// The short top list. Cheap enough to double as a liveness probe.
    async fn leaderboard_top(&self) -> PortResult<Vec<LeaderboardEntry>>;

    async fn leaderboard_position(&self, token: &str) -> PortResult<UserPosition>;
}

/// Durable string key-value storage that survives restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}

/// Wall-clock source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
