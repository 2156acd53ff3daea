//! services/client/src/app/game.rs
//!
//! The live, in-memory copy of the player's game data.

use finance_empire_core::domain::GameData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to the live game state. `None` while no game is loaded.
///
/// Gameplay code mutates it; autosave and the leaderboard only take snapshots.
#[derive(Clone, Default)]
pub struct GameState {
    inner: Arc<RwLock<Option<GameData>>>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, game_data: Option<GameData>) {
        *self.write() = game_data;
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    /// A copy of the current state, detached from later mutations.
    pub fn snapshot(&self) -> Option<GameData> {
        self.read().clone()
    }

    /// Applies `f` to the live state. Returns `false` when no game is loaded.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut GameData),
    {
        match self.write().as_mut() {
            Some(game_data) => {
                f(game_data);
                true
            }
            None => false,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<GameData>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<GameData>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
