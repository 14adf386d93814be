//! Data Transfer Objects for the HTTP API.
//!
//! Engine records (`Line`, `Frame`, `VehicleReport`, ...) already derive
//! Serialize/Deserialize and are returned as-is; the types here are list
//! wrappers, summaries and query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::{
    Frame, Line, RouteInfo, ServiceAlert, TripUpdateSummary, VehicleReport,
};
use crate::models::{Axis, LineId, ViewId};
use crate::render::Layout;
use crate::services::{View, ViewSnapshot};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Number of configured views
    pub views: usize,
    /// Number of views currently refreshing
    pub active_views: usize,
}

/// Line summary for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSummaryDto {
    pub line_id: LineId,
    pub name: String,
    pub route_id: String,
    pub axis: Axis,
    pub station_count: usize,
}

impl From<&Line> for LineSummaryDto {
    fn from(line: &Line) -> Self {
        Self {
            line_id: line.id.clone(),
            name: line.name.clone(),
            route_id: line.route_id.clone(),
            axis: line.axis,
            station_count: line.station_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineListResponse {
    pub lines: Vec<LineSummaryDto>,
    pub total: usize,
}

/// View state without its frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSummaryDto {
    pub view_id: ViewId,
    pub line_ids: Vec<LineId>,
    pub layout: Layout,
    pub active: bool,
    /// Seconds between refreshes
    pub interval_secs: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Number of frames published so far
    pub version: u64,
}

impl ViewSummaryDto {
    pub fn new(view: &View, snapshot: Option<&ViewSnapshot>) -> Self {
        Self {
            view_id: view.id().clone(),
            line_ids: view.line_ids(),
            layout: view.layout(),
            active: view.is_active(),
            interval_secs: view.interval().as_secs(),
            refreshed_at: snapshot.and_then(|s| s.refreshed_at),
            version: snapshot.map_or(0, |s| s.version),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewListResponse {
    pub views: Vec<ViewSummaryDto>,
    pub total: usize,
}

/// A view together with its latest frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDetailResponse {
    #[serde(flatten)]
    pub summary: ViewSummaryDto,
    /// Footer line, e.g. "Last refreshed: ... (Last updated 3 seconds ago)"
    pub status: String,
    pub frame: Option<Frame>,
}

/// Result of an activate/deactivate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub view_id: ViewId,
    pub active: bool,
    /// False when the view was already in the requested state
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleListResponse {
    pub vehicles: Vec<VehicleReport>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertListResponse {
    pub alerts: Vec<ServiceAlert>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripUpdateListResponse {
    pub trip_updates: Vec<TripUpdateSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteInfo>,
    pub total: usize,
}

/// Query parameters for the text endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TextQuery {
    /// Override the view's configured layout
    #[serde(default)]
    pub layout: Option<Layout>,
}

/// Query parameters for the vehicle and trip update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouteFilterQuery {
    /// Only return records on this route
    #[serde(default)]
    pub route_id: Option<String>,
}
