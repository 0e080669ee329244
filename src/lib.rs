//! geosketch - interactive vector-geometry sketching engine
//!
//! Lets a user draw or modify point, line and polygon geometries on a map
//! canvas, including multi-part geometries, polygon holes and GPS tracks,
//! and produces GeoJSON-shaped output. The engine talks to the map through
//! the [`render::RenderPort`] trait and is driven through
//! [`facade::SketchFacade`].

pub mod config;
pub mod constants;
pub mod edit;
pub mod error;
pub mod facade;
pub mod geometry;
pub mod gps;
pub mod history;
pub mod model;
pub mod render;
pub mod replay;
pub mod sketch;
pub mod viewport;

pub use config::SketchConfig;
pub use error::{GeometryError, SketchError};
pub use facade::{PointerEvent, PointerKind, SessionStatus, SketchFacade, SketchOutput};
pub use geometry::Geometry;
pub use model::{DrawMode, Feature, LayerCapabilities, LayerDescriptor, Vertex};
pub use render::{RenderPort, SceneSurface};
