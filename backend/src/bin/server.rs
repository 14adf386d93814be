//! Line map HTTP server binary.
//!
//! Loads configuration and the station registry, builds and activates every
//! configured view, spawns one driver task per view and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin linemap-server
//!
//! # Explicit config file, faster refresh
//! LINEMAP_CONFIG=./linemap.toml LINEMAP_REFRESH_SECS=2 cargo run --bin linemap-server
//! ```
//!
//! # Environment Variables
//!
//! - `LINEMAP_CONFIG`: Path to the config file (default: search for `linemap.toml`)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `LINEMAP_REFRESH_SECS`: Refresh interval override
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use metro_linemap::config::AppConfig;
use metro_linemap::feed::{GtfsRealtimeClient, TransitFeed};
use metro_linemap::http::{create_router, AppState};
use metro_linemap::registry::{StaticRegistry, StationRegistry};
use metro_linemap::scheduler::SystemClock;
use metro_linemap::services::{SnapshotStore, ViewSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting line map server");

    let config = AppConfig::load()?;
    let registry: Arc<dyn StationRegistry> =
        Arc::new(StaticRegistry::load(config.registry.path.as_deref())?);
    config.validate(registry.as_ref())?;
    info!(
        "Registry loaded: {} lines, {} views, refresh every {}s",
        registry.lines().len(),
        config.views.len(),
        config.refresh.interval_secs
    );

    let feed: Arc<dyn TransitFeed> = Arc::new(GtfsRealtimeClient::new(config.feed.clone())?);
    let snapshots = SnapshotStore::new();
    let views = ViewSet::from_config(
        &config,
        registry.as_ref(),
        Arc::clone(&feed),
        Arc::new(snapshots.clone()),
        Arc::new(SystemClock),
    )?;
    for id in views.ids() {
        snapshots.register(&id);
    }

    let _drivers = views.spawn_drivers();
    let started = views.activate_all()?;
    info!("{} views active", started);

    // Create application state
    let state = AppState::new(views, snapshots, registry, feed);

    // Create router with all endpoints
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
