//! services/client/src/app/session.rs
//!
//! Owns the bearer token and the player profile, persists the session identity
//! in durable storage and exposes the authenticated API operations.

use crate::messages::{Locale, Message};
use finance_empire_core::domain::{
    AuthPayload, GameData, LoginRequest, RegisterRequest, User, UserPosition,
};
use finance_empire_core::ports::{GameApiService, KeyValueStore, PortError, PortResult};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Durable storage key holding the bearer token.
pub const TOKEN_KEY: &str = "financeEmpireToken";
/// Durable storage key holding the id of the user the token belongs to.
pub const USER_ID_KEY: &str = "financeEmpireUserId";

//=========================================================================================
// Authentication Outcome
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with a non-success status.
    Rejected,
    /// The server could not be reached or answered with garbage.
    Connection,
    /// The session was torn down while the request was in flight.
    Superseded,
}

/// A failed login or registration, with the message to show the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub message: String,
}

//=========================================================================================
// SessionManager
//=========================================================================================

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    /// Bumped on every teardown. Responses requested under an older
    /// generation must not touch the session.
    generation: u64,
}

pub struct SessionManager {
    api: Arc<dyn GameApiService>,
    store: Arc<dyn KeyValueStore>,
    locale: Locale,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Creates the manager, picking up a token left in storage by a previous run.
    /// The profile stays absent until `load_user_data` confirms the token.
    pub fn new(api: Arc<dyn GameApiService>, store: Arc<dyn KeyValueStore>, locale: Locale) -> Self {
        let token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        if token.is_some() {
            debug!("Found a stored session token.");
        }
        Self {
            api,
            store,
            locale,
            state: RwLock::new(SessionState {
                token,
                ..Default::default()
            }),
        }
    }

    // --- Accessors ---

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    /// A token is held and the profile behind it has been loaded.
    pub fn is_authenticated(&self) -> bool {
        let state = self.read();
        state.token.is_some() && state.user.is_some()
    }

    // --- Authentication ---

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, AuthFailure> {
        let request = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.unwrap_or_default().to_string(),
        };
        let generation = self.read().generation;
        let outcome = self.api.register(&request).await;
        self.establish(generation, outcome, Message::RegistrationFailed)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let generation = self.read().generation;
        let outcome = self.api.login(&request).await;
        self.establish(generation, outcome, Message::LoginFailed)
    }

    fn establish(
        &self,
        generation: u64,
        outcome: PortResult<AuthPayload>,
        rejected: Message,
    ) -> Result<User, AuthFailure> {
        let payload = outcome.map_err(|e| {
            warn!("Authentication failed: {}", e);
            self.failure(&e, rejected)
        })?;

        let mut state = self.write();
        if state.generation != generation {
            warn!("Discarding an authentication response that arrived after logout.");
            return Err(AuthFailure {
                kind: FailureKind::Superseded,
                message: self.locale.text(Message::SessionSuperseded).to_string(),
            });
        }
        state.token = Some(payload.token.clone());
        state.user = Some(payload.user.clone());
        // Storage is written under the guard so a concurrent logout cannot interleave.
        self.persist(&payload.token, &payload.user.id);
        drop(state);

        info!(user_id = %payload.user.id, "Session established for {}", payload.user.username);
        Ok(payload.user)
    }

    fn failure(&self, error: &PortError, rejected: Message) -> AuthFailure {
        if !error.is_rejection() {
            return AuthFailure {
                kind: FailureKind::Connection,
                message: self.locale.text(Message::ServerUnreachable).to_string(),
            };
        }
        let message = error
            .server_message()
            .unwrap_or_else(|| self.locale.text(rejected));
        AuthFailure {
            kind: FailureKind::Rejected,
            message: message.to_string(),
        }
    }

    // --- Authenticated operations ---

    /// Confirms the held token by fetching the profile.
    ///
    /// Any non-success answer from the server invalidates the session, without
    /// telling expired, malformed and server-side failures apart. A transport
    /// failure keeps the token so a later attempt can still resume.
    pub async fn load_user_data(&self) -> Option<User> {
        let (token, generation) = self.credentials()?;

        match self.api.fetch_user(&token).await {
            Ok(user) => {
                let mut state = self.write();
                if !state.is_current(generation, &token) {
                    debug!("Ignoring a profile that arrived for a stale session.");
                    return None;
                }
                state.user = Some(user.clone());
                Some(user)
            }
            Err(e) if e.is_rejection() => {
                warn!("Stored session rejected by the server: {}", e);
                self.invalidate_if_current(generation, &token);
                None
            }
            Err(e) => {
                warn!("Could not load user data: {}", e);
                None
            }
        }
    }

    /// Pushes the game blob to the server. Returns whether the server accepted it.
    /// Never retries or queues; without a token no request is made.
    pub async fn save_game_data(&self, game_data: &GameData) -> bool {
        let Some((token, generation)) = self.credentials() else {
            return false;
        };

        match self.api.save_game(&token, game_data).await {
            Ok(()) => true,
            Err(e) => {
                if e.is_unauthorized() {
                    self.invalidate_if_current(generation, &token);
                }
                warn!("Save failed: {}", e);
                false
            }
        }
    }

    /// The player's overall ranking, or `None` when unauthenticated or on failure.
    pub async fn user_position(&self) -> Option<UserPosition> {
        let (token, generation) = self.credentials()?;

        match self.api.leaderboard_position(&token).await {
            Ok(position) => Some(position),
            Err(e) => {
                if e.is_unauthorized() {
                    self.invalidate_if_current(generation, &token);
                }
                warn!("Could not fetch leaderboard position: {}", e);
                None
            }
        }
    }

    /// Forgets the session locally. Never touches the network.
    pub fn logout(&self) {
        let mut state = self.write();
        state.teardown();
        self.clear_storage();
        drop(state);
        info!("Logged out.");
    }

    // --- Internals ---

    fn credentials(&self) -> Option<(String, u64)> {
        let state = self.read();
        state.token.clone().map(|token| (token, state.generation))
    }

    fn invalidate_if_current(&self, generation: u64, token: &str) {
        let mut state = self.write();
        if !state.is_current(generation, token) {
            return;
        }
        state.teardown();
        self.clear_storage();
        drop(state);
        info!("Session invalidated.");
    }

    fn persist(&self, token: &str, user_id: &str) {
        for (key, value) in [(TOKEN_KEY, token), (USER_ID_KEY, user_id)] {
            if let Err(e) = self.store.set(key, value) {
                warn!("Could not persist {}: {}", key, e);
            }
        }
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_ID_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Could not remove {}: {}", key, e);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionState {
    fn is_current(&self, generation: u64, token: &str) -> bool {
        self.generation == generation && self.token.as_deref() == Some(token)
    }

    fn teardown(&mut self) {
        self.token = None;
        self.user = None;
        self.generation += 1;
    }
}
