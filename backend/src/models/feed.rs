//! Records produced by the upstream feed adapters besides vehicle positions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// First pending stop of a trip, as reported by a GTFS-realtime trip update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripUpdateSummary {
    pub trip_id: String,
    pub route_id: Option<String>,
    /// GTFS schedule relationship name, e.g. "SCHEDULED" or "CANCELED"
    pub schedule_relationship: String,
    pub stop_id: Option<String>,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

/// A service alert from the GTFS-realtime alerts feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAlert {
    pub id: String,
    pub header: String,
    pub description: String,
    pub effect: String,
    pub cause: String,
    pub affected_routes: Vec<String>,
}

/// A route from the NexTrip route listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub route_id: String,
    #[serde(default)]
    pub agency_id: i64,
    pub route_label: String,
}
