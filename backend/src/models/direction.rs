use serde::{Deserialize, Serialize};
use std::fmt;

/// Which coordinate component drives direction inference for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// North/south running line.
    Latitude,
    /// East/west running line.
    Longitude,
}

/// Axis-independent direction label held in the detector cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    Stationary,
    /// Increasing coordinate (north or east).
    Positive,
    /// Decreasing coordinate (south or west).
    Negative,
}

impl Heading {
    /// Map onto the compass direction for `axis`.
    pub fn on_axis(self, axis: Axis) -> Direction {
        match (self, axis) {
            (Heading::Stationary, _) => Direction::Stationary,
            (Heading::Positive, Axis::Latitude) => Direction::North,
            (Heading::Negative, Axis::Latitude) => Direction::South,
            (Heading::Positive, Axis::Longitude) => Direction::East,
            (Heading::Negative, Axis::Longitude) => Direction::West,
        }
    }
}

/// Direction shown for a vehicle on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Stationary,
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stationary => "stationary",
            Direction::North => "northbound",
            Direction::South => "southbound",
            Direction::East => "eastbound",
            Direction::West => "westbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
