//! Nearest-station projection.

use crate::error::{EngineError, EngineResult};
use crate::models::Coordinate;

/// Index of the station closest to `vehicle`.
///
/// Distance is the squared Euclidean distance in raw degree space. When several
/// stations share the minimum distance the first one in line order wins.
///
/// # Errors
/// `InvalidInput` if `stations` is empty or `vehicle` has a non-finite component.
pub fn project(vehicle: Coordinate, stations: &[Coordinate]) -> EngineResult<usize> {
    project_with_distance(vehicle, stations).map(|(index, _)| index)
}

/// Like [`project`], also returning the squared distance to the chosen station.
pub fn project_with_distance(
    vehicle: Coordinate,
    stations: &[Coordinate],
) -> EngineResult<(usize, f64)> {
    if stations.is_empty() {
        return Err(EngineError::invalid_input(
            "cannot project onto an empty station list",
        ));
    }
    if !vehicle.is_finite() {
        return Err(EngineError::invalid_input(format!(
            "vehicle coordinate is not finite: ({}, {})",
            vehicle.latitude, vehicle.longitude
        )));
    }

    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;
    for (index, station) in stations.iter().enumerate() {
        let distance = vehicle.squared_distance(station);
        // Strict comparison keeps the earliest station on ties.
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }

    Ok((best_index, best_distance))
}
