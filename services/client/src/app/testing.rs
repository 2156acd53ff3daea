//! In-crate fakes for the core ports, shared by the unit tests of `app`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use finance_empire_core::domain::{
    AuthPayload, GameData, LeaderboardEntry, LoginRequest, RegisterRequest, User, UserPosition,
};
use finance_empire_core::ports::{Clock, GameApiService, PortError, PortResult};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One request observed by `FakeApi`.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Register { username: String, email: String },
    Login { username: String },
    FetchUser { token: String },
    Save { token: String, game_data: GameData },
    Leaderboard { limit: usize },
    Top,
    Position { token: String },
}

/// Scriptable `GameApiService` that records every request it receives.
pub struct FakeApi {
    pub requests: Mutex<Vec<Request>>,
    pub auth: Mutex<PortResult<AuthPayload>>,
    pub user: Mutex<PortResult<User>>,
    pub save: Mutex<PortResult<()>>,
    pub leaderboard: Mutex<PortResult<Vec<LeaderboardEntry>>>,
    pub top: Mutex<PortResult<Vec<LeaderboardEntry>>>,
    pub position: Mutex<PortResult<UserPosition>>,
    /// When set, `fetch_user` and `login` wait for a permit before answering.
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            auth: Mutex::new(Ok(AuthPayload {
                token: "T1".to_string(),
                user: alice(),
            })),
            user: Mutex::new(Ok(alice())),
            save: Mutex::new(Ok(())),
            leaderboard: Mutex::new(Ok(vec![entry("u7", "whale"), entry("u8", "shark")])),
            top: Mutex::new(Ok(vec![entry("u7", "whale")])),
            position: Mutex::new(Ok(UserPosition {
                position: Some(142),
                total_players: Some(900),
            })),
            gate: Mutex::new(None),
        }
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set<T>(slot: &Mutex<T>, value: T) {
        *slot.lock().unwrap() = value;
    }

    pub fn count(&self, predicate: impl Fn(&Request) -> bool) -> usize {
        self.requests.lock().unwrap().iter().filter(|r| predicate(r)).count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Request> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }

    async fn wait_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl GameApiService for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> PortResult<AuthPayload> {
        self.record(Request::Register {
            username: request.username.clone(),
            email: request.email.clone(),
        });
        self.auth.lock().unwrap().clone()
    }

    async fn login(&self, request: &LoginRequest) -> PortResult<AuthPayload> {
        self.record(Request::Login {
            username: request.username.clone(),
        });
        self.wait_gate().await;
        self.auth.lock().unwrap().clone()
    }

    async fn fetch_user(&self, token: &str) -> PortResult<User> {
        self.record(Request::FetchUser {
            token: token.to_string(),
        });
        self.wait_gate().await;
        self.user.lock().unwrap().clone()
    }

    async fn save_game(&self, token: &str, game_data: &GameData) -> PortResult<()> {
        self.record(Request::Save {
            token: token.to_string(),
            game_data: game_data.clone(),
        });
        self.save.lock().unwrap().clone()
    }

    async fn leaderboard(&self, limit: usize) -> PortResult<Vec<LeaderboardEntry>> {
        self.record(Request::Leaderboard { limit });
        self.leaderboard.lock().unwrap().clone()
    }

    async fn leaderboard_top(&self) -> PortResult<Vec<LeaderboardEntry>> {
        self.record(Request::Top);
        self.top.lock().unwrap().clone()
    }

    async fn leaderboard_position(&self, token: &str) -> PortResult<UserPosition> {
        self.record(Request::Position {
            token: token.to_string(),
        });
        self.position.lock().unwrap().clone()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        })
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock().unwrap() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn alice() -> User {
    User {
        id: "u1".to_string(),
        username: "alice".to_string(),
        email: None,
        game_data: GameData::new(json!({ "money": 100 })),
    }
}

pub fn entry(user_id: &str, username: &str) -> LeaderboardEntry {
    LeaderboardEntry {
        user_id: user_id.to_string(),
        username: username.to_string(),
        prestige_level: 3,
        prestige_points: 12.0,
        total_money: 1_000_000.0,
    }
}

pub fn unauthorized() -> PortError {
    PortError::Rejected {
        status: 401,
        message: Some("Недействительный токен".to_string()),
    }
}

pub fn offline() -> PortError {
    PortError::Transport("connection refused".to_string())
}
