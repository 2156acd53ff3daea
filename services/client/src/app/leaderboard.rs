//! services/client/src/app/leaderboard.rs
//!
//! Time-bounded cache in front of `GET /leaderboard`, and the view model that
//! combines the ranked list with the current player's own standing.

use crate::messages::{Locale, Message};
use chrono::{DateTime, Utc};
use finance_empire_core::domain::{LeaderboardEntry, User, UserPosition};
use finance_empire_core::ports::{Clock, GameApiService, PortResult};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// LeaderboardCache
//=========================================================================================

#[derive(Default)]
struct CacheState {
    entries: Option<Arc<Vec<LeaderboardEntry>>>,
    fetched_at: Option<DateTime<Utc>>,
}

pub struct LeaderboardCache {
    api: Arc<dyn GameApiService>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    limit: usize,
    state: Mutex<CacheState>,
}

impl LeaderboardCache {
    pub fn new(
        api: Arc<dyn GameApiService>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        limit: usize,
    ) -> Self {
        Self {
            api,
            clock,
            ttl,
            limit,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the ranked list, fetching it unless a copy younger than the TTL is held.
    ///
    /// A failed fetch is reported as an error; stale entries are never handed out
    /// in its place, and the previous fetch time is kept so the next call retries.
    pub async fn get_leaderboard(
        &self,
        force_refresh: bool,
    ) -> PortResult<Arc<Vec<LeaderboardEntry>>> {
        if !force_refresh {
            if let Some(entries) = self.fresh_entries() {
                debug!("Serving leaderboard from cache.");
                return Ok(entries);
            }
        }

        let entries = match self.api.leaderboard(self.limit).await {
            Ok(entries) => Arc::new(entries),
            Err(e) => {
                warn!("Leaderboard refresh failed: {}", e);
                return Err(e);
            }
        };

        let mut state = self.lock();
        state.entries = Some(entries.clone());
        state.fetched_at = Some(self.clock.now());
        Ok(entries)
    }

    /// Drops the cached entries so the next read goes to the network.
    pub fn invalidate(&self) {
        self.lock().entries = None;
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.lock().fetched_at
    }

    fn fresh_entries(&self) -> Option<Arc<Vec<LeaderboardEntry>>> {
        let state = self.lock();
        let entries = state.entries.clone()?;
        let fetched_at = state.fetched_at?;
        // A clock that went backwards yields a negative age, which counts as fresh.
        let fresh = match (self.clock.now() - fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        };
        fresh.then_some(entries)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//=========================================================================================
// LeaderboardView
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// 1-based.
    pub rank: usize,
    pub entry: LeaderboardEntry,
    pub is_current_user: bool,
}

/// Where the current player stands when they are outside the fetched top list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnStanding {
    pub username: String,
    pub position: Option<u64>,
    pub total_players: Option<u64>,
}

impl OwnStanding {
    pub fn describe(&self, locale: Locale) -> String {
        match (self.position, self.total_players) {
            (Some(position), Some(total)) => locale.position(position, total),
            (Some(position), None) => format!("#{}", position),
            (None, _) => locale.text(Message::PositionUnknown).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub rows: Vec<RankedEntry>,
    pub own_standing: Option<OwnStanding>,
}

impl LeaderboardView {
    /// Ranks `entries` in order and, for a player missing from them, attaches
    /// their own standing from `position` (unknown when absent).
    pub fn build(
        entries: &[LeaderboardEntry],
        current_user: Option<&User>,
        position: Option<UserPosition>,
    ) -> Self {
        let current_id = current_user.map(|u| u.id.as_str());
        let rows: Vec<RankedEntry> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RankedEntry {
                rank: index + 1,
                entry: entry.clone(),
                is_current_user: Some(entry.user_id.as_str()) == current_id,
            })
            .collect();

        let listed = rows.iter().any(|row| row.is_current_user);
        let own_standing = current_user.filter(|_| !listed).map(|user| OwnStanding {
            username: user.username.clone(),
            position: position.and_then(|p| p.position),
            total_players: position.and_then(|p| p.total_players),
        });

        Self { rows, own_standing }
    }

    /// Whether `user_id` appears among the ranked rows.
    pub fn contains(entries: &[LeaderboardEntry], user_id: &str) -> bool {
        entries.iter().any(|entry| entry.user_id == user_id)
    }
}
