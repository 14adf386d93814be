//! Application state for the HTTP server.

use std::sync::Arc;

use crate::feed::TransitFeed;
use crate::registry::StationRegistry;
use crate::scheduler::{Clock, SystemClock};
use crate::services::{SnapshotStore, ViewSet};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configured views and their schedulers
    pub views: ViewSet,
    /// Latest frame per view
    pub snapshots: SnapshotStore,
    pub registry: Arc<dyn StationRegistry>,
    /// Feed used for the pass-through endpoints (vehicles, alerts, routes)
    pub feed: Arc<dyn TransitFeed>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state on wall-clock time.
    pub fn new(
        views: ViewSet,
        snapshots: SnapshotStore,
        registry: Arc<dyn StationRegistry>,
        feed: Arc<dyn TransitFeed>,
    ) -> Self {
        Self {
            views,
            snapshots,
            registry,
            feed,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
