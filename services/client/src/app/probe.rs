//! services/client/src/app/probe.rs
//!
//! Periodic connectivity check against the API. Purely observational: the
//! indicator it publishes is never consulted by the session or autosave.

use crate::messages::{Locale, Message};
use finance_empire_core::ports::GameApiService;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unknown,
    Online,
    Offline,
}

/// What the status badge shows. Online hides itself shortly after a
/// successful check; Offline stays up until the server answers again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionIndicator {
    pub status: ConnectionStatus,
    pub visible: bool,
}

impl ConnectionIndicator {
    pub fn label(&self, locale: Locale) -> Option<&'static str> {
        if !self.visible {
            return None;
        }
        match self.status {
            ConnectionStatus::Online => Some(locale.text(Message::Online)),
            ConnectionStatus::Offline => Some(locale.text(Message::Offline)),
            ConnectionStatus::Unknown => None,
        }
    }
}

impl Default for ConnectionIndicator {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Unknown,
            visible: false,
        }
    }
}

struct ProbeShared {
    api: Arc<dyn GameApiService>,
    hide_after: Duration,
    sender: watch::Sender<ConnectionIndicator>,
    checks: AtomicU64,
}

pub struct ConnectionProbe {
    shared: Arc<ProbeShared>,
    interval: Duration,
    active: Mutex<Option<CancellationToken>>,
}

impl ConnectionProbe {
    pub fn new(api: Arc<dyn GameApiService>, interval: Duration, hide_after: Duration) -> Self {
        let (sender, _) = watch::channel(ConnectionIndicator::default());
        Self {
            shared: Arc::new(ProbeShared {
                api,
                hide_after,
                sender,
                checks: AtomicU64::new(0),
            }),
            interval,
            active: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionIndicator> {
        self.shared.sender.subscribe()
    }

    pub fn current(&self) -> ConnectionIndicator {
        *self.shared.sender.borrow()
    }

    /// Checks immediately, then once per interval. Restarting replaces the previous loop.
    pub fn start(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }
        tokio::spawn(probe_process(self.shared.clone(), self.interval, token));
    }

    pub fn stop(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ConnectionProbe {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ProbeShared {
    async fn check(self: &Arc<Self>, token: &CancellationToken) {
        let check = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        let status = match self.api.leaderboard_top().await {
            Ok(_) => ConnectionStatus::Online,
            Err(e) => {
                debug!("Connection check failed: {}", e);
                ConnectionStatus::Offline
            }
        };

        let previous = self.sender.send_replace(ConnectionIndicator {
            status,
            visible: true,
        });
        if previous.status != status {
            match status {
                ConnectionStatus::Offline => warn!("API unreachable."),
                _ => info!("API reachable."),
            }
        }

        if status == ConnectionStatus::Online {
            let shared = self.clone();
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = time::sleep(shared.hide_after) => shared.hide(check),
                }
            });
        }
    }

    /// Hides the Online badge unless a newer check has run since.
    fn hide(&self, check: u64) {
        if self.checks.load(Ordering::SeqCst) != check {
            return;
        }
        self.sender.send_if_modified(|indicator| {
            let hide = indicator.status == ConnectionStatus::Online && indicator.visible;
            if hide {
                indicator.visible = false;
            }
            hide
        });
    }
}

async fn probe_process(shared: Arc<ProbeShared>, period: Duration, token: CancellationToken) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        shared.check(&token).await;
    }
}
