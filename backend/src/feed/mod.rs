//! Upstream transit feeds.
//!
//! [`TransitFeed`] is the seam between the refresh pipeline and the network.
//! The production adapter is [`GtfsRealtimeClient`]; [`ScriptedFeed`] replays
//! canned cycles for tests and offline runs.

pub mod gtfs;
pub mod nextrip;
pub mod scripted;

pub use gtfs::GtfsRealtimeClient;
pub use scripted::ScriptedFeed;

use async_trait::async_trait;
use log::warn;

use crate::error::EngineResult;
use crate::models::{RouteInfo, ServiceAlert, TripUpdateSummary, VehicleReport};

/// Source of realtime and route data.
///
/// Every method reports network and decoding problems as
/// `UpstreamUnavailable`.
#[async_trait]
pub trait TransitFeed: Send + Sync {
    /// Current position of every vehicle in the feed, all routes.
    async fn fetch_vehicle_positions(&self) -> EngineResult<Vec<VehicleReport>>;

    async fn fetch_trip_updates(&self) -> EngineResult<Vec<TripUpdateSummary>>;

    async fn fetch_alerts(&self) -> EngineResult<Vec<ServiceAlert>>;

    async fn fetch_routes(&self) -> EngineResult<Vec<RouteInfo>>;
}

/// Vehicle positions, or an empty list when the upstream is unavailable.
///
/// A failed fetch must never leave stale vehicles on a map, so the caller
/// renders this cycle as plain track.
pub async fn fetch_or_empty(feed: &dyn TransitFeed) -> Vec<VehicleReport> {
    match feed.fetch_vehicle_positions().await {
        Ok(vehicles) => vehicles,
        Err(e) => {
            warn!("vehicle positions unavailable, rendering empty track: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_fetch_or_empty_passes_vehicles_through() {
        let feed = ScriptedFeed::new();
        feed.push_vehicles(vec![VehicleReport::new("1", "901", 44.9, -93.2, Utc::now())]);

        let vehicles = fetch_or_empty(&feed).await;
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].vehicle_id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_fetch_or_empty_swallows_upstream_failure() {
        let feed = ScriptedFeed::new();
        feed.push_failure("503 Service Unavailable");

        assert!(fetch_or_empty(&feed).await.is_empty());
    }
}
