//! Direction inference with hysteresis.
//!
//! Each vehicle keeps a sliding window of its last two samples on the line's
//! axis. The signed difference between them is compared against an
//! axis-specific threshold: small movements are treated as GPS jitter and keep
//! the previously inferred direction, larger ones set a new direction. The
//! window and the cached direction are owned by one [`DirectionDetector`];
//! every line in every view gets its own detector so vehicle state never
//! leaks between lines.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::models::{Axis, Coordinate, Direction, Heading, VehicleId};

/// Number of samples kept per vehicle.
const HISTORY_DEPTH: usize = 2;

/// Minimum per-cycle movement, in degrees, that changes a cached direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionThresholds {
    #[serde(default = "default_latitude_threshold")]
    pub latitude: f64,
    #[serde(default = "default_longitude_threshold")]
    pub longitude: f64,
}

fn default_latitude_threshold() -> f64 {
    0.0001
}

fn default_longitude_threshold() -> f64 {
    0.00005
}

impl Default for DirectionThresholds {
    fn default() -> Self {
        Self {
            latitude: default_latitude_threshold(),
            longitude: default_longitude_threshold(),
        }
    }
}

impl DirectionThresholds {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn for_axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }
}

#[derive(Debug, Clone)]
struct DirectionState {
    /// Oldest first.
    history: VecDeque<f64>,
    heading: Heading,
    last_seen: DateTime<Utc>,
}

impl DirectionState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_DEPTH),
            heading: Heading::Stationary,
            last_seen: now,
        }
    }

    fn push(&mut self, value: f64) {
        if self.history.len() == HISTORY_DEPTH {
            self.history.pop_front();
        }
        self.history.push_back(value);
    }

    fn delta(&self) -> Option<f64> {
        if self.history.len() < HISTORY_DEPTH {
            return None;
        }
        Some(self.history[HISTORY_DEPTH - 1] - self.history[HISTORY_DEPTH - 2])
    }
}

/// Classify a movement against the hysteresis threshold.
/// `None` means the movement is noise.
fn classify(delta: f64, threshold: f64) -> Option<Heading> {
    if delta >= threshold {
        Some(Heading::Positive)
    } else if delta <= -threshold {
        Some(Heading::Negative)
    } else {
        None
    }
}

/// Per-vehicle direction state for one line.
#[derive(Debug, Clone, Default)]
pub struct DirectionDetector {
    thresholds: DirectionThresholds,
    stale_after: Option<Duration>,
    states: HashMap<VehicleId, DirectionState>,
}

impl DirectionDetector {
    pub fn new(thresholds: DirectionThresholds) -> Self {
        Self {
            thresholds,
            stale_after: None,
            states: HashMap::new(),
        }
    }

    /// Drop vehicle state not refreshed within `stale_after` when
    /// [`evict_stale`](Self::evict_stale) runs.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }

    pub fn thresholds(&self) -> DirectionThresholds {
        self.thresholds
    }

    /// Feed a new sighting of `vehicle_id` and return its direction.
    pub fn update(&mut self, vehicle_id: &VehicleId, coordinate: Coordinate, axis: Axis) -> Direction {
        self.update_at(vehicle_id, coordinate, axis, Utc::now())
    }

    /// [`update`](Self::update) with an explicit sighting time.
    ///
    /// A non-finite sample leaves the history untouched and returns the cached
    /// direction.
    pub fn update_at(
        &mut self,
        vehicle_id: &VehicleId,
        coordinate: Coordinate,
        axis: Axis,
        now: DateTime<Utc>,
    ) -> Direction {
        let value = coordinate.component(axis);
        if !value.is_finite() {
            return self.heading_of(vehicle_id).unwrap_or_default().on_axis(axis);
        }

        let threshold = self.thresholds.for_axis(axis);
        let state = self
            .states
            .entry(vehicle_id.clone())
            .or_insert_with(|| DirectionState::new(now));
        state.last_seen = now;
        state.push(value);

        let Some(delta) = state.delta() else {
            return state.heading.on_axis(axis);
        };

        if let Some(heading) = classify(delta, threshold) {
            if heading != state.heading {
                debug!(
                    "vehicle {} changed heading {:?} -> {:?} (delta {:.6})",
                    vehicle_id, state.heading, heading, delta
                );
                state.heading = heading;
            }
        }

        state.heading.on_axis(axis)
    }

    /// Cached heading for a vehicle, if it has been seen.
    pub fn heading_of(&self, vehicle_id: &VehicleId) -> Option<Heading> {
        self.states.get(vehicle_id).map(|s| s.heading)
    }

    /// Drop state for vehicles not seen since `now - stale_after`.
    /// Returns the number of evicted vehicles; a no-op without a staleness window.
    pub fn evict_stale(&mut self, now: DateTime<Utc>) -> usize {
        let Some(stale_after) = self.stale_after else {
            return 0;
        };
        let before = self.states.len();
        self.states
            .retain(|_, state| now.signed_duration_since(state.last_seen) <= stale_after);
        let evicted = before - self.states.len();
        if evicted > 0 {
            debug!("evicted {} stale vehicle direction states", evicted);
        }
        evicted
    }

    /// Number of vehicles with tracked state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
