//! GeoJSON geometry model and the pure math used to build and compare it.

mod geojson;
pub mod math;

pub use geojson::Geometry;
pub use math::{assemble, close_ring, normalize, open_ring, parts_for_mode};
