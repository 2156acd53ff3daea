//! services/client/src/app/autosave.rs
//!
//! Periodic, best-effort push of the live game state to the server.

use crate::app::{game::GameState, session::SessionManager};
use finance_empire_core::domain::GameData;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct AutosaveCoordinator {
    session: Arc<SessionManager>,
    game: GameState,
    period: Duration,
    /// Cancels the running timer task. At most one is active.
    active: Mutex<Option<CancellationToken>>,
}

impl AutosaveCoordinator {
    pub fn new(session: Arc<SessionManager>, game: GameState, period: Duration) -> Self {
        Self {
            session,
            game,
            period,
            active: Mutex::new(None),
        }
    }

    /// Starts the timer, cancelling any timer started earlier.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
            debug!("Replaced a running autosave timer.");
        }

        tokio::spawn(autosave_process(
            self.session.clone(),
            self.game.clone(),
            self.period,
            token,
        ));
        info!("Autosave started every {:?}.", self.period);
    }

    /// Cancels the timer. Saves already in flight are left to finish.
    pub fn stop(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
            info!("Autosave stopped.");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().as_ref().is_some_and(|token| !token.is_cancelled())
    }

    /// One save attempt for process exit. The process may end before it completes.
    pub async fn save_on_exit(&self) -> bool {
        match self.ready_snapshot() {
            Some(snapshot) => self.session.save_game_data(&snapshot).await,
            None => false,
        }
    }

    fn ready_snapshot(&self) -> Option<GameData> {
        snapshot_if_ready(&self.session, &self.game)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AutosaveCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn snapshot_if_ready(session: &SessionManager, game: &GameState) -> Option<GameData> {
    if !session.is_authenticated() {
        return None;
    }
    game.snapshot()
}

/// The timer loop. Each tick spawns its own save so a slow request never
/// delays the next tick; overlapping saves resolve as last-response-wins.
async fn autosave_process(
    session: Arc<SessionManager>,
    game: GameState,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let Some(snapshot) = snapshot_if_ready(&session, &game) else {
            debug!("Autosave tick skipped: no game or no user.");
            continue;
        };

        let session = session.clone();
        tokio::spawn(async move {
            if session.save_game_data(&snapshot).await {
                info!("Autosave completed.");
            }
        });
    }
}
