//! Sketch state machine, vertex handles and the multi-geometry store.

mod handles;
mod multi;
mod session;

pub use handles::{DragState, Handle, HandleKind, VertexHandleController, build_handles};
pub use multi::{MultiGeometryStore, NavDirection};
pub use session::{SketchEvent, SketchPhase, SketchSession, SketchSnapshot};
