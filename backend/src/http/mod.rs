//! HTTP server module for the line map service.
//!
//! Exposes views, lines and the upstream feeds as a REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing, JSON and text responses, SSE          │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ reads
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  SnapshotStore (services::snapshot)                       │
//! │  - Latest frame per view                                  │
//! └───────────────────▲──────────────────────────────────────┘
//!                     │ publishes
//! ┌───────────────────┴──────────────────────────────────────┐
//! │  Views (services::view), one driver task each             │
//! │  - Scheduler -> feed -> engine                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
