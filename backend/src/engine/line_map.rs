//! Line map assembly: projection plus direction inference for one line.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;

use super::direction::DirectionDetector;
use super::projector;
use crate::models::{Axis, Coordinate, Line, LineHeader, LineMap, LineMapEntry, Station, VehicleReport};

/// Build per-station entries for `stations` from vehicles already filtered to
/// this line.
///
/// Vehicles are processed in order; when several land on the same station the
/// last one decides the marker. Vehicles whose coordinates cannot be projected
/// are skipped for this cycle.
pub fn build(
    stations: &[Station],
    vehicles: &[VehicleReport],
    axis: Axis,
    detector: &mut DirectionDetector,
) -> Vec<LineMapEntry> {
    build_at(stations, vehicles, axis, None, detector, Utc::now())
}

fn build_at<'a>(
    stations: &[Station],
    vehicles: impl IntoIterator<Item = &'a VehicleReport>,
    axis: Axis,
    snap_radius: Option<f64>,
    detector: &mut DirectionDetector,
    now: DateTime<Utc>,
) -> Vec<LineMapEntry> {
    let mut entries: Vec<LineMapEntry> = stations
        .iter()
        .cloned()
        .map(LineMapEntry::unoccupied)
        .collect();
    let coords: Vec<Coordinate> = stations.iter().map(Station::coordinate).collect();
    let max_distance = snap_radius.map(|r| r * r);

    for vehicle in vehicles {
        let position = vehicle.coordinate();
        let (index, distance) = match projector::project_with_distance(position, &coords) {
            Ok(found) => found,
            Err(e) => {
                warn!("skipping vehicle {}: {}", vehicle.vehicle_id, e);
                continue;
            }
        };

        let direction = detector.update_at(&vehicle.vehicle_id, position, axis, now);

        if max_distance.is_some_and(|max| distance > max) {
            debug!(
                "vehicle {} is between stations (nearest {}, distance² {:.8})",
                vehicle.vehicle_id, stations[index].name, distance
            );
            continue;
        }

        entries[index].occupy(vehicle.vehicle_id.clone(), direction);
    }

    entries
}

/// Owns one line and its direction state across refresh cycles.
#[derive(Debug, Clone)]
pub struct LineMapBuilder {
    line: Arc<Line>,
    detector: DirectionDetector,
}

impl LineMapBuilder {
    pub fn new(line: Arc<Line>, detector: DirectionDetector) -> Self {
        Self { line, detector }
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn detector(&self) -> &DirectionDetector {
        &self.detector
    }

    /// Run one cycle over the full (unfiltered) vehicle list.
    pub fn build(&mut self, vehicles: &[VehicleReport], now: DateTime<Utc>) -> LineMap {
        let route_id = self.line.route_id.as_str();
        let on_line = vehicles.iter().filter(|v| v.route_id == route_id);

        let entries = build_at(
            &self.line.stations,
            on_line,
            self.line.axis,
            self.line.snap_radius,
            &mut self.detector,
            now,
        );
        self.detector.evict_stale(now);

        LineMap {
            line: LineHeader::from(self.line.as_ref()),
            entries,
            refreshed_at: now,
        }
    }
}
