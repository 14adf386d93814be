use serde::{Deserialize, Serialize};

use super::{Axis, Coordinate, LineId};

/// A stop on a line. `index` is the position in physical line order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub index: usize,
}

impl Station {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// One rail line as loaded from the station registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    /// Display name, e.g. "Blue Line"
    pub name: String,
    /// Route identifier used by the realtime feed for vehicles on this line
    pub route_id: String,
    pub axis: Axis,
    /// Vehicles farther than this (in degrees) from every station are between
    /// stations and do not mark any station as occupied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_radius: Option<f64>,
    pub stations: Vec<Station>,
}

impl Line {
    /// Station coordinates in line order, ready for projection.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.stations.iter().map(Station::coordinate).collect()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}
