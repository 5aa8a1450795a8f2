//! Route gateway: merges every subrouter and attaches the shared state, so
//! `main.rs` only sees a single [`router`] call.

use axum::Router;

use crate::backend::BackendClient;
use crate::display::DisplayClock;
use crate::session::ChartSessions;
use crate::Config;

mod health;
mod readings;
mod usage;

pub use readings::ChartResponse;
pub use usage::{UsageResponse, NO_USAGE_MESSAGE};

// ---

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub config: Config,
    pub sessions: ChartSessions,
    pub clock: DisplayClock,
}

impl AppState {
    pub fn new(backend: BackendClient, config: Config) -> Self {
        // ---
        let clock = DisplayClock::from_offset_hours(config.display_offset_hours);
        Self {
            backend,
            config,
            sessions: ChartSessions::default(),
            clock,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(usage::router())
        .merge(health::router())
        .with_state(state)
}
