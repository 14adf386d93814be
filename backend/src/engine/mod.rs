//! Vehicle projection and direction inference engine.
//!
//! ```text
//! vehicles ─► projector ─► direction ─► line_map ─► compositor ─► frame
//!             (station)    (heading)    (entries)   (two lines)
//! ```
//!
//! Everything here is synchronous and allocation-light; the only state that
//! survives a refresh cycle lives in [`DirectionDetector`].

pub mod compositor;
pub mod direction;
pub mod line_map;
pub mod projector;

pub use compositor::combine;
pub use direction::{DirectionDetector, DirectionThresholds};
pub use line_map::{build, LineMapBuilder};
pub use projector::{project, project_with_distance};
