//! Map-to-screen projection.
//!
//! The proximity-close rule and handle hit-testing work in screen pixels so
//! that they behave the same at every zoom level. This module holds the
//! transform that gets us there.

use serde::{Deserialize, Serialize};

use crate::model::Vertex;

/// A point in screen pixels (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance in pixels.
    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Pan/zoom state of the map view.
///
/// `zoom` is pixels per map unit; `pan_x`/`pan_y` is the screen position of
/// the map origin. Map y grows upwards, screen y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Viewport {
    /// Create a new viewport with the given zoom and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity viewport (one pixel per map unit, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Project a map vertex to screen pixels.
    pub fn to_screen(&self, v: &Vertex) -> ScreenPoint {
        ScreenPoint::new(self.pan_x + v.x * self.zoom, self.pan_y - v.y * self.zoom)
    }

    /// Unproject screen pixels to a map vertex.
    pub fn to_map(&self, p: &ScreenPoint) -> Vertex {
        let zoom = if self.zoom.abs() < f64::EPSILON {
            1.0
        } else {
            self.zoom
        };
        Vertex::new((p.x - self.pan_x) / zoom, (self.pan_y - p.y) / zoom)
    }

    /// Screen-space distance in pixels between two map vertices.
    pub fn screen_distance(&self, a: &Vertex, b: &Vertex) -> f64 {
        self.to_screen(a).distance_to(&self.to_screen(b))
    }

    /// Zoom about a screen point so the map position under it stays fixed.
    pub fn zoom_to_cursor(&self, new_zoom: f64, cursor: ScreenPoint) -> Viewport {
        let anchor = self.to_map(&cursor);
        Viewport {
            zoom: new_zoom,
            pan_x: cursor.x - anchor.x * new_zoom,
            pan_y: cursor.y + anchor.y * new_zoom,
        }
    }

    /// Apply a pan delta in pixels.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_round_trip() {
        let viewport = Viewport::new(250.0, 400.0, 300.0);
        let v = Vertex::new(10.5, 59.25);
        let back = viewport.to_map(&viewport.to_screen(&v));
        assert!(approx_eq(back.x, v.x));
        assert!(approx_eq(back.y, v.y));
    }

    #[test]
    fn test_y_axis_flipped() {
        let viewport = Viewport::identity();
        let up = viewport.to_screen(&Vertex::new(0.0, 10.0));
        assert!(up.y < 0.0);
    }

    #[test]
    fn test_screen_distance_scales_with_zoom() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(0.01, 0.0);
        assert!(approx_eq(Viewport::new(100.0, 0.0, 0.0).screen_distance(&a, &b), 1.0));
        assert!(approx_eq(Viewport::new(1000.0, 0.0, 0.0).screen_distance(&a, &b), 10.0));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let viewport = Viewport::new(2.0, 50.0, 30.0);
        let cursor = ScreenPoint::new(150.0, 120.0);
        let before = viewport.to_map(&cursor);
        let after = viewport.zoom_to_cursor(8.0, cursor).to_map(&cursor);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_pan_by() {
        let viewport = Viewport::identity().pan_by(10.0, -5.0);
        assert_eq!(viewport.pan_x, 10.0);
        assert_eq!(viewport.pan_y, -5.0);
    }
}
