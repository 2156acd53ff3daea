//! crates/finance_empire_core/src/domain.rs
//!
//! Defines the core data structures exchanged with the Finance Empire API.
//! The JSON shapes follow the API's camelCase wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque game progress blob. The client never looks inside it; it is
/// received with the user profile and sent back verbatim on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameData(pub Value);

impl GameData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for GameData {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}

/// A player profile as returned by `/login`, `/register` and `/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub game_data: GameData,
}

/// Successful authentication payload: the bearer token and the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Credentials for `POST /register`. The email is sent as an empty string when absent.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Credentials for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /save`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest<'a> {
    pub game_data: &'a GameData,
}

/// One row of the ranked leaderboard. The rank is the row's position in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub prestige_level: u32,
    #[serde(default)]
    pub prestige_points: f64,
    #[serde(default)]
    pub total_money: f64,
}

/// The authenticated player's place in the overall ranking.
/// `position` is `null` when the server cannot place the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosition {
    pub position: Option<u64>,
    #[serde(default)]
    pub total_players: Option<u64>,
}
