//! services/client/src/app/controller.rs
//!
//! The top-level application controller. It owns every piece of client state
//! (session, game, leaderboard cache, timers) and ties their lifecycles to
//! startup, login and logout.

use crate::app::{
    autosave::AutosaveCoordinator,
    game::GameState,
    leaderboard::{LeaderboardCache, LeaderboardView},
    notify::{Notification, Notifier},
    probe::{ConnectionIndicator, ConnectionProbe},
    session::{AuthFailure, SessionManager},
    state::AppState,
};
use crate::messages::{Locale, Message};
use finance_empire_core::domain::{GameData, User};
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedReceiver, watch};
use tracing::info;

pub struct AppController {
    locale: Locale,
    session: Arc<SessionManager>,
    game: GameState,
    leaderboard: LeaderboardCache,
    autosave: AutosaveCoordinator,
    probe: ConnectionProbe,
    notifier: Notifier,
}

impl AppController {
    /// Builds the controller and the receiving end of its notifications.
    pub fn new(state: AppState) -> (Self, UnboundedReceiver<Notification>) {
        let config = state.config;
        let (notifier, notifications) = Notifier::channel();
        let session = Arc::new(SessionManager::new(
            state.api.clone(),
            state.store,
            config.locale,
        ));
        let game = GameState::new();

        let controller = Self {
            locale: config.locale,
            leaderboard: LeaderboardCache::new(
                state.api.clone(),
                state.clock,
                config.leaderboard_ttl,
                config.leaderboard_limit,
            ),
            autosave: AutosaveCoordinator::new(
                session.clone(),
                game.clone(),
                config.autosave_interval,
            ),
            probe: ConnectionProbe::new(state.api, config.probe_interval, config.probe_hide_after),
            session,
            game,
            notifier,
        };
        (controller, notifications)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn is_autosave_running(&self) -> bool {
        self.autosave.is_running()
    }

    // --- Session lifecycle ---

    /// Silently resumes a stored session. Returns the user when it worked.
    pub async fn init(&self) -> Option<User> {
        if !self.session.has_token() {
            return None;
        }
        self.notifier.info(self.locale.text(Message::LoadingData));

        let user = self.session.load_user_data().await?;
        info!("Resumed session for {}", user.username);
        self.begin(&user);
        Some(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        match self.session.login(username, password).await {
            Ok(user) => {
                self.begin(&user);
                Ok(user)
            }
            Err(failure) => {
                self.notifier.error(failure.message.clone());
                Err(failure)
            }
        }
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, AuthFailure> {
        match self.session.register(username, password, email).await {
            Ok(user) => {
                self.begin(&user);
                self.notifier
                    .success(self.locale.text(Message::RegistrationSucceeded));
                Ok(user)
            }
            Err(failure) => {
                self.notifier.error(failure.message.clone());
                Err(failure)
            }
        }
    }

    pub fn logout(&self) {
        self.session.logout();
        self.autosave.stop();
        self.game.clear();
    }

    fn begin(&self, user: &User) {
        self.game.replace(Some(user.game_data.clone()));
        self.autosave.start();
    }

    // --- Game state ---

    pub fn game_state(&self) -> Option<GameData> {
        self.game.snapshot()
    }

    pub fn set_game_state(&self, game_data: GameData) {
        self.game.replace(Some(game_data));
    }

    pub fn update_game_state<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut GameData),
    {
        self.game.update(f)
    }

    /// Best-effort save when the player leaves. Completion is not guaranteed.
    pub async fn page_exit(&self) -> bool {
        self.autosave.save_on_exit().await
    }

    // --- Leaderboard ---

    /// Opening the leaderboard always refetches, whatever the cache age.
    pub async fn open_leaderboard(&self) -> Option<LeaderboardView> {
        self.leaderboard.invalidate();
        self.leaderboard_view().await
    }

    /// The leaderboard as cached, refetched only once the TTL has passed.
    pub async fn leaderboard(&self) -> Option<LeaderboardView> {
        self.leaderboard_view().await
    }

    async fn leaderboard_view(&self) -> Option<LeaderboardView> {
        let entries = match self.leaderboard.get_leaderboard(false).await {
            Ok(entries) => entries,
            Err(_) => {
                self.notifier.error(self.locale.text(Message::LeaderboardFailed));
                return None;
            }
        };

        let user = self.session.current_user();
        let position = match &user {
            Some(user) if !LeaderboardView::contains(&entries, &user.id) => {
                self.session.user_position().await
            }
            _ => None,
        };
        Some(LeaderboardView::build(&entries, user.as_ref(), position))
    }

    // --- Connectivity ---

    pub fn start_probe(&self) -> watch::Receiver<ConnectionIndicator> {
        let receiver = self.probe.subscribe();
        self.probe.start();
        receiver
    }

    /// Stops every timer. Session and storage are left as they are.
    pub fn shutdown(&self) {
        self.autosave.stop();
        self.probe.stop();
    }
}
