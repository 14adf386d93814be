//! HTTP handlers for the REST API.
//!
//! View endpoints read published snapshots; they never run the pipeline
//! themselves. The feed endpoints pass straight through to the upstream.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{
    ActivationResponse, AlertListResponse, HealthResponse, Line, LineListResponse,
    LineSummaryDto, RouteFilterQuery, RouteListResponse, TextQuery, TripUpdateListResponse,
    VehicleListResponse, ViewDetailResponse, ViewListResponse, ViewSummaryDto,
};
use super::error::AppError;
use super::state::AppState;
use crate::render::{render_frame, status_line};
use crate::scheduler::Clock;
use crate::services::View;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// How often the stream endpoint checks for a new frame.
const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(200);

fn find_view(state: &AppState, view_id: &str) -> Result<Arc<View>, AppError> {
    state
        .views
        .get(view_id)
        .ok_or_else(|| AppError::NotFound(format!("View {} not found", view_id)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        views: state.views.len(),
        active_views: state.views.iter().filter(|v| v.is_active()).count(),
    }))
}

// =============================================================================
// Lines
// =============================================================================

/// GET /v1/lines
pub async fn list_lines(State(state): State<AppState>) -> HandlerResult<LineListResponse> {
    let lines: Vec<LineSummaryDto> = state
        .registry
        .lines()
        .iter()
        .map(|line| LineSummaryDto::from(line.as_ref()))
        .collect();
    let total = lines.len();
    Ok(Json(LineListResponse { lines, total }))
}

/// GET /v1/lines/{line_id}
///
/// Full line definition including stations.
pub async fn get_line(
    State(state): State<AppState>,
    Path(line_id): Path<String>,
) -> HandlerResult<Line> {
    let line = state.registry.line(&line_id)?;
    Ok(Json(line.as_ref().clone()))
}

// =============================================================================
// Views
// =============================================================================

/// GET /v1/views
pub async fn list_views(State(state): State<AppState>) -> HandlerResult<ViewListResponse> {
    let views: Vec<ViewSummaryDto> = state
        .views
        .iter()
        .map(|view| {
            let snapshot = state.snapshots.get(view.id().as_str());
            ViewSummaryDto::new(view, snapshot.as_ref())
        })
        .collect();
    let total = views.len();
    Ok(Json(ViewListResponse { views, total }))
}

/// GET /v1/views/{view_id}
///
/// Latest frame of a view.
pub async fn get_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<ViewDetailResponse> {
    let view = find_view(&state, &view_id)?;
    let snapshot = state.snapshots.get(&view_id);
    let refreshed_at = snapshot.as_ref().and_then(|s| s.refreshed_at);

    Ok(Json(ViewDetailResponse {
        summary: ViewSummaryDto::new(&view, snapshot.as_ref()),
        status: status_line(refreshed_at, state.clock.now()),
        frame: snapshot.and_then(|s| s.frame),
    }))
}

/// GET /v1/views/{view_id}/text
///
/// Latest frame rendered as a plain-text map with legend and status line.
pub async fn get_view_text(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Query(query): Query<TextQuery>,
) -> Result<String, AppError> {
    let view = find_view(&state, &view_id)?;
    let layout = query.layout.unwrap_or_else(|| view.layout());
    let snapshot = state.snapshots.get(&view_id);
    let refreshed_at = snapshot.as_ref().and_then(|s| s.refreshed_at);

    let body = match snapshot.and_then(|s| s.frame) {
        Some(frame) => render_frame(&frame, layout),
        None => "Waiting for the first refresh...".to_string(),
    };
    Ok(format!(
        "{}\n\n{}\n",
        body,
        status_line(refreshed_at, state.clock.now())
    ))
}

/// GET /v1/views/{view_id}/stream
///
/// Server-Sent Events: one `frame` event with the snapshot every time the view
/// publishes, starting with the current one if any.
pub async fn stream_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    find_view(&state, &view_id)?;

    let snapshots = state.snapshots.clone();
    let stream = async_stream::stream! {
        let mut last_version = 0;
        loop {
            if let Some(snapshot) = snapshots.get(&view_id) {
                if snapshot.version != last_version {
                    last_version = snapshot.version;
                    let event_data = serde_json::to_string(&snapshot).unwrap_or_default();
                    yield Ok(Event::default().event("frame").data(event_data));
                }
            }

            tokio::time::sleep(STREAM_POLL_INTERVAL).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}

/// POST /v1/views/{view_id}/activate
pub async fn activate_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<ActivationResponse> {
    let view = find_view(&state, &view_id)?;
    let changed = view.activate()?;
    Ok(Json(ActivationResponse {
        view_id: view.id().clone(),
        active: view.is_active(),
        changed,
    }))
}

/// POST /v1/views/{view_id}/deactivate
pub async fn deactivate_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<ActivationResponse> {
    let view = find_view(&state, &view_id)?;
    let changed = view.deactivate();
    Ok(Json(ActivationResponse {
        view_id: view.id().clone(),
        active: view.is_active(),
        changed,
    }))
}

// =============================================================================
// Feed pass-through
// =============================================================================

/// GET /v1/vehicles?route_id=901
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<RouteFilterQuery>,
) -> HandlerResult<VehicleListResponse> {
    let mut vehicles = state.feed.fetch_vehicle_positions().await?;
    if let Some(route_id) = query.route_id {
        vehicles.retain(|v| v.route_id == route_id);
    }
    let total = vehicles.len();
    Ok(Json(VehicleListResponse { vehicles, total }))
}

/// GET /v1/trip-updates?route_id=901
pub async fn list_trip_updates(
    State(state): State<AppState>,
    Query(query): Query<RouteFilterQuery>,
) -> HandlerResult<TripUpdateListResponse> {
    let mut trip_updates = state.feed.fetch_trip_updates().await?;
    if let Some(route_id) = query.route_id {
        trip_updates.retain(|u| u.route_id.as_deref() == Some(route_id.as_str()));
    }
    let total = trip_updates.len();
    Ok(Json(TripUpdateListResponse {
        trip_updates,
        total,
    }))
}

/// GET /v1/alerts
pub async fn list_alerts(State(state): State<AppState>) -> HandlerResult<AlertListResponse> {
    let alerts = state.feed.fetch_alerts().await?;
    let total = alerts.len();
    Ok(Json(AlertListResponse { alerts, total }))
}

/// GET /v1/routes
pub async fn list_routes(State(state): State<AppState>) -> HandlerResult<RouteListResponse> {
    let routes = state.feed.fetch_routes().await?;
    let total = routes.len();
    Ok(Json(RouteListResponse { routes, total }))
}
