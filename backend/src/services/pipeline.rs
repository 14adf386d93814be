//! Per-view processing: one line builder, or two for a combined view.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::ViewKind;
use crate::engine::{combine, DirectionDetector, DirectionThresholds, LineMapBuilder};
use crate::error::EngineResult;
use crate::models::{CombinedMap, Frame, Line, LineId, VehicleReport};
use crate::registry::StationRegistry;

/// Direction settings shared by every builder of a view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectorSettings {
    pub thresholds: DirectionThresholds,
    pub stale_after: Option<chrono::Duration>,
}

impl DetectorSettings {
    fn detector(&self) -> DirectionDetector {
        let detector = DirectionDetector::new(self.thresholds);
        match self.stale_after {
            Some(window) => detector.with_stale_after(window),
            None => detector,
        }
    }

    fn builder(&self, line: Arc<Line>) -> LineMapBuilder {
        LineMapBuilder::new(line, self.detector())
    }
}

/// The engine half of a view. Owns the direction state of its lines.
#[derive(Debug, Clone)]
pub enum ViewPipeline {
    Line(LineMapBuilder),
    Combined {
        left: LineMapBuilder,
        right: LineMapBuilder,
    },
}

impl ViewPipeline {
    /// Resolve the view's lines in `registry`.
    ///
    /// # Errors
    /// `UnknownLine` if any line is missing; the view cannot be built.
    pub fn for_view(
        kind: &ViewKind,
        registry: &dyn StationRegistry,
        settings: DetectorSettings,
    ) -> EngineResult<Self> {
        match kind {
            ViewKind::Line { line } => Ok(Self::Line(settings.builder(registry.line(line)?))),
            ViewKind::Combined { left, right } => Ok(Self::Combined {
                left: settings.builder(registry.line(left)?),
                right: settings.builder(registry.line(right)?),
            }),
        }
    }

    pub fn line_ids(&self) -> Vec<LineId> {
        match self {
            Self::Line(builder) => vec![builder.line().id.clone()],
            Self::Combined { left, right } => vec![left.line().id.clone(), right.line().id.clone()],
        }
    }

    /// Run one cycle over the full vehicle list.
    pub fn run(&mut self, vehicles: &[VehicleReport], now: DateTime<Utc>) -> Frame {
        match self {
            Self::Line(builder) => Frame::Line(builder.build(vehicles, now)),
            Self::Combined { left, right } => {
                let left_map = left.build(vehicles, now);
                let right_map = right.build(vehicles, now);
                Frame::Combined(CombinedMap {
                    left: left_map.line,
                    right: right_map.line,
                    frame: combine(left_map.entries, right_map.entries),
                    refreshed_at: now,
                })
            }
        }
    }
}
