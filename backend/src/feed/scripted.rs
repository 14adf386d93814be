//! Deterministic in-memory feed.
//!
//! Each call to `fetch_vehicle_positions` consumes the next scripted cycle.
//! Once the script is exhausted the feed reports no vehicles.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::TransitFeed;
use crate::error::{EngineError, EngineResult};
use crate::models::{RouteInfo, ServiceAlert, TripUpdateSummary, VehicleReport};

#[derive(Debug, Clone)]
enum Cycle {
    Vehicles(Vec<VehicleReport>),
    Failure(String),
}

/// A [`TransitFeed`] that replays queued cycles.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    cycles: Mutex<VecDeque<Cycle>>,
    trip_updates: Mutex<Vec<TripUpdateSummary>>,
    alerts: Mutex<Vec<ServiceAlert>>,
    routes: Mutex<Vec<RouteInfo>>,
    fetches: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cycle that returns `vehicles`.
    pub fn push_vehicles(&self, vehicles: Vec<VehicleReport>) {
        self.cycles.lock().push_back(Cycle::Vehicles(vehicles));
    }

    /// Queue a cycle that fails with `UpstreamUnavailable`.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.cycles.lock().push_back(Cycle::Failure(message.into()));
    }

    pub fn set_trip_updates(&self, updates: Vec<TripUpdateSummary>) {
        *self.trip_updates.lock() = updates;
    }

    pub fn set_alerts(&self, alerts: Vec<ServiceAlert>) {
        *self.alerts.lock() = alerts;
    }

    pub fn set_routes(&self, routes: Vec<RouteInfo>) {
        *self.routes.lock() = routes;
    }

    /// Cycles still queued.
    pub fn remaining(&self) -> usize {
        self.cycles.lock().len()
    }

    /// Number of vehicle position fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransitFeed for ScriptedFeed {
    async fn fetch_vehicle_positions(&self) -> EngineResult<Vec<VehicleReport>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.cycles.lock().pop_front() {
            Some(Cycle::Vehicles(vehicles)) => Ok(vehicles),
            Some(Cycle::Failure(message)) => Err(EngineError::upstream(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_trip_updates(&self) -> EngineResult<Vec<TripUpdateSummary>> {
        Ok(self.trip_updates.lock().clone())
    }

    async fn fetch_alerts(&self) -> EngineResult<Vec<ServiceAlert>> {
        Ok(self.alerts.lock().clone())
    }

    async fn fetch_routes(&self) -> EngineResult<Vec<RouteInfo>> {
        Ok(self.routes.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_cycles_replay_in_order() {
        let feed = ScriptedFeed::new();
        feed.push_vehicles(vec![VehicleReport::new("a", "901", 1.0, 0.0, Utc::now())]);
        feed.push_failure("timeout");
        feed.push_vehicles(vec![]);

        assert_eq!(feed.fetch_vehicle_positions().await.unwrap().len(), 1);
        let err = feed.fetch_vehicle_positions().await.unwrap_err();
        assert_eq!(err, EngineError::upstream("timeout"));
        assert!(feed.fetch_vehicle_positions().await.unwrap().is_empty());
        assert_eq!(feed.remaining(), 0);
        assert_eq!(feed.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_script_reports_no_vehicles() {
        let feed = ScriptedFeed::new();
        assert!(feed.fetch_vehicle_positions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_collections() {
        let feed = ScriptedFeed::new();
        feed.set_routes(vec![RouteInfo {
            route_id: "901".into(),
            agency_id: 0,
            route_label: "METRO Blue Line".into(),
        }]);
        assert_eq!(feed.fetch_routes().await.unwrap().len(), 1);
        assert!(feed.fetch_alerts().await.unwrap().is_empty());
    }
}
