pub mod coordinate;
pub mod direction;
pub mod feed;
pub mod line_map;
pub mod macros;
pub mod station;
pub mod vehicle;

pub use coordinate::*;
pub use direction::*;
pub use feed::*;
pub use line_map::*;
pub use station::*;
pub use vehicle::*;

crate::define_id_type!(LineId);
crate::define_id_type!(VehicleId);
crate::define_id_type!(ViewId);
