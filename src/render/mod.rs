//! Rendering port.
//!
//! The sketch engine never talks to a map library directly. Everything it
//! needs from the drawing surface goes through [`RenderPort`]; each target
//! surface gets its own adapter.

mod scene;

use serde::Serialize;

pub use scene::{SceneSurface, SceneVisual};

use crate::model::{RingId, Vertex};
use crate::sketch::Handle;
use crate::viewport::Viewport;

/// Opaque key of a drawn handle, issued by the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleKey(pub u64);

/// What a ring visual represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VisualRole {
    /// A ring of the active sketch
    Active(RingId),
    /// The hole currently being drawn
    HoleDraft,
    /// The outer ring of a committed part of a multi-geometry
    Committed(usize),
}

/// Drawing surface used by the engine.
pub trait RenderPort {
    /// Current map view, used for screen-space distances.
    fn viewport(&self) -> Viewport;

    /// Draw a vertex or midpoint handle and return its key.
    fn draw_handle(&mut self, handle: &Handle) -> HandleKey;

    /// Remove a handle drawn earlier.
    fn remove_handle(&mut self, key: HandleKey);

    /// Replace the visual for `role` with `vertices`.
    fn update_ring_visual(&mut self, role: VisualRole, vertices: &[Vertex], closed: bool);

    /// Remove every ring visual.
    fn clear_visuals(&mut self);
}
