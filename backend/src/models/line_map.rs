use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Axis, Direction, Line, LineId, Station, VehicleId};

/// One station row of a line map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMapEntry {
    pub station: Station,
    pub occupied: bool,
    pub direction: Direction,
    /// Last vehicle projected onto this station in the cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
    /// Number of vehicles projected onto this station in the cycle
    #[serde(default)]
    pub occupants: usize,
}

impl LineMapEntry {
    /// Plain track: no vehicle at this station.
    pub fn unoccupied(station: Station) -> Self {
        Self {
            station,
            occupied: false,
            direction: Direction::Stationary,
            vehicle_id: None,
            occupants: 0,
        }
    }

    /// Record a vehicle at this station. Last write wins for the marker.
    pub fn occupy(&mut self, vehicle_id: VehicleId, direction: Direction) {
        self.occupied = true;
        self.direction = direction;
        self.vehicle_id = Some(vehicle_id);
        self.occupants += 1;
    }
}

/// Identity of the line a map was built for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineHeader {
    pub line_id: LineId,
    pub line_name: String,
    pub axis: Axis,
}

impl From<&Line> for LineHeader {
    fn from(line: &Line) -> Self {
        Self {
            line_id: line.id.clone(),
            line_name: line.name.clone(),
            axis: line.axis,
        }
    }
}

/// Per-station occupancy for one line, recomputed every refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMap {
    #[serde(flatten)]
    pub line: LineHeader,
    pub entries: Vec<LineMapEntry>,
    pub refreshed_at: DateTime<Utc>,
}

impl LineMap {
    pub fn occupied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.occupied).count()
    }
}

/// One row of a dual-line frame. `None` is a blank cell past the end of the
/// shorter line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub left: Option<LineMapEntry>,
    pub right: Option<LineMapEntry>,
}

/// Two line maps aligned by row index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CombinedFrame {
    pub rows: Vec<CombinedRow>,
}

impl CombinedFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A combined frame together with the lines it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMap {
    pub left: LineHeader,
    pub right: LineHeader,
    pub frame: CombinedFrame,
    pub refreshed_at: DateTime<Utc>,
}

/// Output of one refresh cycle of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Frame {
    Line(LineMap),
    Combined(CombinedMap),
}

impl Frame {
    pub fn refreshed_at(&self) -> DateTime<Utc> {
        match self {
            Frame::Line(map) => map.refreshed_at,
            Frame::Combined(map) => map.refreshed_at,
        }
    }

    /// Number of occupied stations across all lines in the frame.
    pub fn occupied_count(&self) -> usize {
        match self {
            Frame::Line(map) => map.occupied_count(),
            Frame::Combined(map) => map
                .frame
                .rows
                .iter()
                .map(|row| {
                    let left = row.left.as_ref().is_some_and(|e| e.occupied);
                    let right = row.right.as_ref().is_some_and(|e| e.occupied);
                    usize::from(left) + usize::from(right)
                })
                .sum(),
        }
    }
}
