use serde::{Deserialize, Serialize};

use super::Axis;

/// A WGS84 position in raw degrees.
///
/// Distances between coordinates are measured in degree space without any
/// geodesic correction; station spacing on the modelled lines is large compared
/// with GPS error, so nearest-station decisions are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Squared Euclidean distance in (latitude, longitude) degree space.
    pub fn squared_distance(&self, other: &Coordinate) -> f64 {
        let dlat = other.latitude - self.latitude;
        let dlon = other.longitude - self.longitude;
        dlat * dlat + dlon * dlon
    }

    /// The component that drives direction inference on `axis`.
    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }
}
