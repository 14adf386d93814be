//! View orchestration.
//!
//! Glues the engine to its collaborators: a [`View`] pairs a
//! [`ViewPipeline`] with a scheduler, a feed and a render sink, and the
//! [`SnapshotStore`] keeps what each view last published.

pub mod pipeline;
pub mod snapshot;
pub mod view;
pub mod views;

pub use pipeline::{DetectorSettings, ViewPipeline};
pub use snapshot::{SnapshotStore, ViewSnapshot};
pub use view::View;
pub use views::ViewSet;
