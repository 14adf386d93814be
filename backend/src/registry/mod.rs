//! Station registry.
//!
//! The registry is the single source of static line geography. Lines are read
//! from a TOML document (see `data/metro_lines.toml`) once at startup and are
//! shared read-only between views afterwards.
//!
//! ```toml
//! [[lines]]
//! id = "blue"
//! name = "Blue Line"
//! route_id = "901"
//! axis = "latitude"
//!
//! [[lines.stations]]
//! name = "Target Field"
//! latitude = 44.98273774554354
//! longitude = -93.2771229326485
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::models::{Axis, Line, LineId, Station};

/// Registry bundled with the crate: METRO Blue and Green lines.
const BUNDLED_REGISTRY: &str = include_str!("../../data/metro_lines.toml");

/// Lookup of static line data.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; views on different tasks share one
/// registry.
pub trait StationRegistry: Send + Sync {
    /// The line with `line_id`.
    ///
    /// # Errors
    /// `UnknownLine` when no line has this id.
    fn line(&self, line_id: &str) -> EngineResult<Arc<Line>>;

    /// All lines in registry order.
    fn lines(&self) -> Vec<Arc<Line>>;
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    lines: Vec<LineDefinition>,
}

#[derive(Debug, Deserialize)]
struct LineDefinition {
    id: String,
    name: String,
    route_id: String,
    axis: Axis,
    #[serde(default)]
    snap_radius: Option<f64>,
    #[serde(default)]
    stations: Vec<StationDefinition>,
}

#[derive(Debug, Deserialize)]
struct StationDefinition {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl From<LineDefinition> for Line {
    fn from(def: LineDefinition) -> Self {
        let stations = def
            .stations
            .into_iter()
            .enumerate()
            .map(|(index, s)| Station {
                name: s.name,
                latitude: s.latitude,
                longitude: s.longitude,
                index,
            })
            .collect();

        Line {
            id: LineId::new(def.id),
            name: def.name,
            route_id: def.route_id,
            axis: def.axis,
            snap_radius: def.snap_radius,
            stations,
        }
    }
}

/// In-memory registry loaded once.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    lines: Vec<Arc<Line>>,
}

impl StaticRegistry {
    /// Build a registry from already-constructed lines.
    ///
    /// # Errors
    /// `Configuration` if a line has no stations, a duplicate id, a non-finite
    /// station coordinate or a non-positive snap radius.
    pub fn from_lines(lines: Vec<Line>) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for line in &lines {
            if !seen.insert(line.id.clone()) {
                return Err(EngineError::configuration(format!(
                    "duplicate line id '{}'",
                    line.id
                )));
            }
            validate_line(line)?;
        }

        Ok(Self {
            lines: lines.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a registry TOML document.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::from_lines(file.lines.into_iter().map(Line::from).collect())
    }

    /// Load a registry TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::configuration(format!(
                "Failed to read registry file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// The registry shipped with the crate.
    pub fn bundled() -> EngineResult<Self> {
        Self::from_toml_str(BUNDLED_REGISTRY)
    }

    /// Load from `path` when given, otherwise the bundled registry.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }
}

fn validate_line(line: &Line) -> EngineResult<()> {
    if line.stations.is_empty() {
        return Err(EngineError::configuration(format!(
            "line '{}' has no stations",
            line.id
        )));
    }
    if let Some(station) = line.stations.iter().find(|s| !s.coordinate().is_finite()) {
        return Err(EngineError::configuration(format!(
            "station '{}' on line '{}' has a non-finite coordinate",
            station.name, line.id
        )));
    }
    if line.snap_radius.is_some_and(|r| r.is_nan() || r <= 0.0) {
        return Err(EngineError::configuration(format!(
            "line '{}' snap_radius must be positive",
            line.id
        )));
    }
    Ok(())
}

impl StationRegistry for StaticRegistry {
    fn line(&self, line_id: &str) -> EngineResult<Arc<Line>> {
        self.lines
            .iter()
            .find(|line| line.id.as_str() == line_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownLine(line_id.to_string()))
    }

    fn lines(&self) -> Vec<Arc<Line>> {
        self.lines.clone()
    }
}
