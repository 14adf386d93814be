//! Rendering of refresh results.
//!
//! Views hand every finished frame to a [`RenderSink`]. The text renderers in
//! [`text`] and [`status`] turn frames into the plain-text maps served over
//! HTTP.

pub mod status;
pub mod text;

pub use status::status_line;
pub use text::{render_frame, Layout};

use chrono::{DateTime, Utc};

use crate::models::{Frame, ViewId};

/// Consumer of refresh results.
///
/// # Thread Safety
/// Views publish from their own driver tasks, so implementations must be
/// `Send + Sync`.
pub trait RenderSink: Send + Sync {
    /// Replace whatever `view_id` currently shows with `frame`.
    fn publish(&self, view_id: &ViewId, frame: Frame, refreshed_at: DateTime<Utc>);
}
