//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-mostly public API, any origin may poll it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Static line data
        .route("/lines", get(handlers::list_lines))
        .route("/lines/{line_id}", get(handlers::get_line))
        // Views
        .route("/views", get(handlers::list_views))
        .route("/views/{view_id}", get(handlers::get_view))
        .route("/views/{view_id}/text", get(handlers::get_view_text))
        .route("/views/{view_id}/stream", get(handlers::stream_view))
        .route("/views/{view_id}/activate", post(handlers::activate_view))
        .route("/views/{view_id}/deactivate", post(handlers::deactivate_view))
        // Upstream pass-through
        .route("/vehicles", get(handlers::list_vehicles))
        .route("/trip-updates", get(handlers::list_trip_updates))
        .route("/alerts", get(handlers::list_alerts))
        .route("/routes", get(handlers::list_routes));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::feed::ScriptedFeed;
    use crate::registry::StaticRegistry;
    use crate::services::{SnapshotStore, ViewSet};

    #[test]
    fn test_router_creation() {
        let state = AppState::new(
            ViewSet::default(),
            SnapshotStore::new(),
            Arc::new(StaticRegistry::bundled().unwrap()),
            Arc::new(ScriptedFeed::new()),
        );
        let _router = create_router(state);
    }
}
