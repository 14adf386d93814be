use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinate, VehicleId};

/// One vehicle position report from the realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleReport {
    pub vehicle_id: VehicleId,
    pub route_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed in meters per second, when the feed reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    pub timestamp: DateTime<Utc>,
}

impl VehicleReport {
    /// Minimal report, mostly useful for tests and scripted feeds.
    pub fn new(
        vehicle_id: impl Into<VehicleId>,
        route_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            route_id: route_id.into(),
            trip_id: None,
            latitude,
            longitude,
            speed: None,
            timestamp,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
