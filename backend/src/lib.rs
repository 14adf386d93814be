//! # Metro Line Map
//!
//! Live linear maps of METRO light rail lines.
//!
//! Vehicle positions from the Metro Transit GTFS-realtime feed are snapped to
//! the nearest station of each line, a short per-vehicle position history
//! infers the direction of travel, and the result is published as a
//! per-station occupancy map on a fixed refresh cadence. The maps are served
//! as JSON, plain text and Server-Sent Events over an Axum REST API.
//!
//! ## Architecture
//!
//! - [`models`]: Stations, lines, vehicle reports, line maps and frames
//! - [`registry`]: Static station data per line
//! - [`engine`]: Projection, direction inference, line map building, composition
//! - [`scheduler`]: Start/stop-able periodic refresh with an injectable clock
//! - [`feed`]: GTFS-realtime and NexTrip adapters plus a scripted feed
//! - [`render`]: Render sinks and the plain-text map renderers
//! - [`services`]: Views, their pipelines and the snapshot store
//! - [`config`]: `linemap.toml` loading and validation
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod models;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{EngineError, EngineResult};
