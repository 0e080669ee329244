//! Retained in-memory drawing surface with SVG export.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{HandleKey, RenderPort, VisualRole};
use crate::model::Vertex;
use crate::sketch::{Handle, HandleKind};
use crate::viewport::Viewport;

/// A ring visual held by the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneVisual {
    pub vertices: Vec<Vertex>,
    pub closed: bool,
}

/// In-memory [`RenderPort`] adapter.
///
/// Keeps the last state pushed by the engine so it can be inspected or
/// exported.
#[derive(Debug, Clone, Default)]
pub struct SceneSurface {
    viewport: Viewport,
    handles: BTreeMap<HandleKey, Handle>,
    visuals: BTreeMap<VisualRole, SceneVisual>,
    next_key: u64,
    /// Total handle draw calls, for spotting rebuild churn.
    draw_calls: usize,
}

impl SceneSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Change the view (pan/zoom).
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Handles currently on the surface.
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.handles.values()
    }

    /// Number of handles of the given kind.
    pub fn handle_count(&self, kind: HandleKind) -> usize {
        self.handles.values().filter(|h| h.kind == kind).count()
    }

    /// Visual for a role, if drawn.
    pub fn visual(&self, role: VisualRole) -> Option<&SceneVisual> {
        self.visuals.get(&role)
    }

    /// Number of ring visuals.
    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    /// Total number of `draw_handle` calls so far.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// Render the scene as an SVG document of the given pixel size.
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        svg.push('\n');

        for (role, visual) in &self.visuals {
            let points = visual
                .vertices
                .iter()
                .map(|v| {
                    let p = self.viewport.to_screen(v);
                    format!("{:.1},{:.1}", p.x, p.y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let (tag, stroke) = match (visual.closed, role) {
                (true, VisualRole::HoleDraft) => ("polygon", "#e0a030"),
                (true, _) => ("polygon", "#3070e0"),
                (false, VisualRole::Committed(_)) => ("polyline", "#808080"),
                (false, _) => ("polyline", "#3070e0"),
            };
            let _ = writeln!(
                svg,
                r#"  <{tag} points="{points}" fill="none" stroke="{stroke}" stroke-width="2"/>"#
            );
        }

        for handle in self.handles.values() {
            let p = self.viewport.to_screen(&handle.position);
            let (radius, fill) = match handle.kind {
                HandleKind::Vertex => (5.0, "#ffffff"),
                HandleKind::Midpoint => (3.0, "#c0c0c0"),
            };
            let _ = writeln!(
                svg,
                r##"  <circle cx="{:.1}" cy="{:.1}" r="{radius}" fill="{fill}" stroke="#3070e0"/>"##,
                p.x, p.y
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl RenderPort for SceneSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw_handle(&mut self, handle: &Handle) -> HandleKey {
        let key = HandleKey(self.next_key);
        self.next_key += 1;
        self.draw_calls += 1;
        self.handles.insert(key, handle.clone());
        key
    }

    fn remove_handle(&mut self, key: HandleKey) {
        if self.handles.remove(&key).is_none() {
            log::warn!("Scene: removing unknown handle {:?}", key);
        }
    }

    fn update_ring_visual(&mut self, role: VisualRole, vertices: &[Vertex], closed: bool) {
        if vertices.is_empty() {
            self.visuals.remove(&role);
            return;
        }
        self.visuals.insert(
            role,
            SceneVisual {
                vertices: vertices.to_vec(),
                closed,
            },
        );
    }

    fn clear_visuals(&mut self) {
        self.visuals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RingId;

    #[test]
    fn test_empty_visual_removes_role() {
        let mut scene = SceneSurface::default();
        let role = VisualRole::Active(RingId::Outer);
        scene.update_ring_visual(role, &[Vertex::new(0.0, 0.0)], false);
        assert!(scene.visual(role).is_some());
        scene.update_ring_visual(role, &[], false);
        assert!(scene.visual(role).is_none());
    }

    #[test]
    fn test_svg_contains_shapes() {
        let mut scene = SceneSurface::new(Viewport::new(10.0, 0.0, 100.0));
        scene.update_ring_visual(
            VisualRole::Active(RingId::Outer),
            &[Vertex::new(0.0, 0.0), Vertex::new(5.0, 0.0), Vertex::new(5.0, 5.0)],
            true,
        );
        scene.draw_handle(&Handle::vertex(RingId::Outer, 0, Vertex::new(0.0, 0.0)));
        let svg = scene.to_svg(200, 200);
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<circle"));
        assert!(svg.ends_with("</svg>\n"));
    }
}
