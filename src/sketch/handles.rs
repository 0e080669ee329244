//! Interactive vertex and midpoint handles for a finalized sketch.
//!
//! Handles are derived data. Every rebuild tears the whole set down and
//! recreates it from the rings of the active sketch, and gestures on a
//! handle are translated into [`SketchEvent`]s so the session stays the only
//! place where rings change.

use serde::Serialize;

use super::session::SketchEvent;
use crate::model::{ActiveSketch, DrawMode, RingId, Vertex};
use crate::render::{HandleKey, RenderPort};
use crate::viewport::Viewport;

/// Kind of handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HandleKind {
    /// Draggable handle on an existing vertex
    Vertex,
    /// Handle between two vertices; pressing it inserts a vertex
    Midpoint,
}

/// A handle on the map.
///
/// For vertex handles `index` is the vertex index. For midpoint handles it
/// is the index the inserted vertex will get.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handle {
    pub kind: HandleKind,
    pub ring: RingId,
    pub index: usize,
    pub position: Vertex,
}

impl Handle {
    pub fn vertex(ring: RingId, index: usize, position: Vertex) -> Self {
        Self {
            kind: HandleKind::Vertex,
            ring,
            index,
            position,
        }
    }

    pub fn midpoint(ring: RingId, index: usize, position: Vertex) -> Self {
        Self {
            kind: HandleKind::Midpoint,
            ring,
            index,
            position,
        }
    }
}

/// Compute the handle set for a sketch.
///
/// One vertex handle per vertex and one midpoint handle per segment,
/// including the closing segment of polygon rings.
pub fn build_handles(sketch: &ActiveSketch) -> Vec<Handle> {
    let mut handles = Vec::new();
    for (id, ring) in sketch.rings() {
        handles.extend(
            ring.iter()
                .enumerate()
                .map(|(i, v)| Handle::vertex(id, i, *v)),
        );
        if sketch.mode == DrawMode::Point || ring.len() < 2 {
            continue;
        }
        handles.extend(
            ring.windows(2)
                .enumerate()
                .map(|(i, pair)| Handle::midpoint(id, i + 1, pair[0].midpoint(&pair[1]))),
        );
        if sketch.mode.is_closed() && ring.len() >= 3 {
            if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                handles.push(Handle::midpoint(id, ring.len(), last.midpoint(first)));
            }
        }
    }
    handles
}

/// Drag gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { ring: RingId, index: usize },
}

/// Owns the drawn handles and the drag gesture.
#[derive(Debug, Default)]
pub struct VertexHandleController {
    drawn: Vec<(Handle, HandleKey)>,
    drag: DragState,
}

impl VertexHandleController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles currently drawn.
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.drawn.iter().map(|(handle, _)| handle)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Tear down every handle and draw a fresh set for `sketch`.
    pub fn rebuild(&mut self, sketch: Option<&ActiveSketch>, port: &mut dyn RenderPort) {
        self.teardown(port);
        if let Some(sketch) = sketch {
            for handle in build_handles(sketch) {
                let key = port.draw_handle(&handle);
                self.drawn.push((handle, key));
            }
        }
        log::trace!("Rebuilt {} handles", self.drawn.len());
    }

    /// Remove every handle from the surface.
    pub fn teardown(&mut self, port: &mut dyn RenderPort) {
        for (_, key) in self.drawn.drain(..) {
            port.remove_handle(key);
        }
    }

    /// Remove all handles and abandon any drag.
    pub fn clear(&mut self, port: &mut dyn RenderPort) {
        self.teardown(port);
        self.drag = DragState::Idle;
    }

    /// Closest handle within `radius_px` screen pixels of `at`.
    ///
    /// Vertex handles win over midpoints at equal reach.
    pub fn hit_test(&self, at: &Vertex, viewport: &Viewport, radius_px: f64) -> Option<Handle> {
        let nearest = |kind: HandleKind| {
            self.handles()
                .filter(|h| h.kind == kind)
                .map(|h| (viewport.screen_distance(&h.position, at), h))
                .filter(|(d, _)| *d <= radius_px)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, h)| h.clone())
        };
        nearest(HandleKind::Vertex).or_else(|| nearest(HandleKind::Midpoint))
    }

    /// Start a drag on `handle`.
    ///
    /// A midpoint press yields the insert event and promotes the midpoint to
    /// a live vertex, so press-drag-release inserts and positions in one
    /// gesture.
    pub fn press(&mut self, handle: &Handle) -> Option<SketchEvent> {
        self.drag = DragState::Dragging {
            ring: handle.ring,
            index: handle.index,
        };
        log::debug!("✋ Pressed {:?} handle {:?}[{}]", handle.kind, handle.ring, handle.index);
        match handle.kind {
            HandleKind::Vertex => None,
            HandleKind::Midpoint => Some(SketchEvent::InsertVertex {
                ring: handle.ring,
                index: handle.index,
                at: handle.position,
            }),
        }
    }

    /// Move event for the vertex being dragged.
    pub fn drag_to(&self, at: Vertex) -> Option<SketchEvent> {
        match self.drag {
            DragState::Dragging { ring, index } => Some(SketchEvent::MoveVertex { ring, index, to: at }),
            DragState::Idle => None,
        }
    }

    /// End the drag. Returns whether one was in progress.
    pub fn release(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            log::debug!("Drag ended");
        }
        self.drag = DragState::Idle;
        was_dragging
    }

    /// Delete event for a vertex handle; midpoints cannot be deleted.
    pub fn delete(&self, handle: &Handle) -> Option<SketchEvent> {
        match handle.kind {
            HandleKind::Vertex => Some(SketchEvent::DeleteVertex {
                ring: handle.ring,
                index: handle.index,
            }),
            HandleKind::Midpoint => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SceneSurface;

    fn square() -> ActiveSketch {
        let mut sketch = ActiveSketch::new(DrawMode::Polygon);
        sketch.outer = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(4.0, 0.0),
            Vertex::new(4.0, 4.0),
            Vertex::new(0.0, 4.0),
        ];
        sketch
    }

    #[test]
    fn test_polygon_handles_include_closing_midpoint() {
        let handles = build_handles(&square());
        let vertices = handles.iter().filter(|h| h.kind == HandleKind::Vertex).count();
        let midpoints: Vec<&Handle> = handles.iter().filter(|h| h.kind == HandleKind::Midpoint).collect();
        assert_eq!(vertices, 4);
        assert_eq!(midpoints.len(), 4);
        let closing = midpoints.iter().find(|h| h.index == 4).unwrap();
        assert_eq!(closing.position, Vertex::new(0.0, 2.0));
    }

    #[test]
    fn test_line_handles_have_no_closing_midpoint() {
        let mut sketch = square();
        sketch.mode = DrawMode::Line;
        let midpoints = build_handles(&sketch)
            .into_iter()
            .filter(|h| h.kind == HandleKind::Midpoint)
            .count();
        assert_eq!(midpoints, 3);
    }

    #[test]
    fn test_point_has_single_vertex_handle() {
        let mut sketch = ActiveSketch::new(DrawMode::Point);
        sketch.outer = vec![Vertex::new(1.0, 1.0)];
        assert_eq!(build_handles(&sketch).len(), 1);
    }

    #[test]
    fn test_hole_rings_get_handles() {
        let mut sketch = square();
        sketch.holes.push(vec![
            Vertex::new(1.0, 1.0),
            Vertex::new(2.0, 1.0),
            Vertex::new(2.0, 2.0),
        ]);
        let hole_handles = build_handles(&sketch)
            .into_iter()
            .filter(|h| h.ring == RingId::Hole(0))
            .count();
        assert_eq!(hole_handles, 6);
    }

    #[test]
    fn test_rebuild_tears_down_previous_set() {
        let mut scene = SceneSurface::default();
        let mut controller = VertexHandleController::new();
        controller.rebuild(Some(&square()), &mut scene);
        controller.rebuild(Some(&square()), &mut scene);
        assert_eq!(scene.handles().count(), 8);
        assert_eq!(scene.draw_calls(), 16);
        controller.rebuild(None, &mut scene);
        assert_eq!(scene.handles().count(), 0);
    }

    #[test]
    fn test_hit_test_prefers_vertices() {
        let mut scene = SceneSurface::default();
        let mut controller = VertexHandleController::new();
        controller.rebuild(Some(&square()), &mut scene);
        let viewport = Viewport::new(10.0, 0.0, 0.0);

        let hit = controller.hit_test(&Vertex::new(0.1, 0.0), &viewport, 8.0).unwrap();
        assert_eq!(hit.kind, HandleKind::Vertex);
        assert_eq!(hit.index, 0);

        let hit = controller.hit_test(&Vertex::new(2.0, 0.1), &viewport, 8.0).unwrap();
        assert_eq!(hit.kind, HandleKind::Midpoint);
        assert_eq!(hit.index, 1);

        assert!(controller.hit_test(&Vertex::new(2.0, 2.0), &viewport, 8.0).is_none());
    }

    #[test]
    fn test_midpoint_press_inserts_then_drags_new_vertex() {
        let mut controller = VertexHandleController::new();
        let midpoint = Handle::midpoint(RingId::Outer, 1, Vertex::new(2.0, 0.0));
        let event = controller.press(&midpoint);
        assert_eq!(
            event,
            Some(SketchEvent::InsertVertex {
                ring: RingId::Outer,
                index: 1,
                at: Vertex::new(2.0, 0.0)
            })
        );
        assert_eq!(
            controller.drag_to(Vertex::new(2.0, -1.0)),
            Some(SketchEvent::MoveVertex {
                ring: RingId::Outer,
                index: 1,
                to: Vertex::new(2.0, -1.0)
            })
        );
        assert!(controller.release());
        assert!(controller.drag_to(Vertex::new(0.0, 0.0)).is_none());
    }
}
