//! services/client/src/app/state.rs
//!
//! The adapters and configuration the application controller is built from.

use crate::config::Config;
use finance_empire_core::ports::{Clock, GameApiService, KeyValueStore};
use std::sync::Arc;

/// Shared application state, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn GameApiService>,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}
