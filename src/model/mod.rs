//! Data models for the sketching engine.

mod layer;
mod sketch;

pub use layer::{Feature, LayerCapabilities, LayerDescriptor};
pub use sketch::{
    ActiveSketch, CommittedPart, DrawMode, MIN_LINE_VERTICES, MIN_POLYGON_VERTICES, Ring, RingId,
    Vertex,
};
