//! Sketch data types: draw modes, vertices, rings and parts.

use serde::{Deserialize, Serialize};

use crate::geometry::math::round_coord;

/// Minimum number of vertices for a line.
pub const MIN_LINE_VERTICES: usize = 2;

/// Minimum number of vertices for a polygon ring.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Geometry kind being drawn. Fixed for the lifetime of a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Single-click point markers
    Point,
    /// Open polylines
    Line,
    /// Closed polygons, optionally with holes
    Polygon,
}

impl DrawMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Point => "Point",
            DrawMode::Line => "Line",
            DrawMode::Polygon => "Polygon",
        }
    }

    /// Get all draw modes.
    pub fn all() -> &'static [DrawMode] {
        &[DrawMode::Point, DrawMode::Line, DrawMode::Polygon]
    }

    /// Minimum vertex count of a valid ring in this mode.
    pub fn min_vertices(&self) -> usize {
        match self {
            DrawMode::Point => 1,
            DrawMode::Line => MIN_LINE_VERTICES,
            DrawMode::Polygon => MIN_POLYGON_VERTICES,
        }
    }

    /// Whether rings of this mode are closed (last vertex connects to first).
    pub fn is_closed(&self) -> bool {
        matches!(self, DrawMode::Polygon)
    }

    /// Whether a GPS track can be recorded in this mode.
    pub fn supports_track(&self) -> bool {
        !matches!(self, DrawMode::Point)
    }
}

/// A position in map coordinates (longitude/latitude or projected x/y).
///
/// Serialized as a GeoJSON `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in map units.
    pub fn distance_to(&self, other: &Vertex) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two vertices.
    pub fn midpoint(&self, other: &Vertex) -> Vertex {
        Vertex::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Round both coordinates to `precision` decimals.
    pub fn rounded(&self, precision: u32) -> Vertex {
        Vertex::new(round_coord(self.x, precision), round_coord(self.y, precision))
    }

    /// Equality after rounding to `precision` decimals.
    pub fn same_as(&self, other: &Vertex, precision: u32) -> bool {
        self.rounded(precision) == other.rounded(precision)
    }

    /// Convert to a GeoJSON position.
    pub fn to_position(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Vertex {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(v: Vertex) -> Self {
        [v.x, v.y]
    }
}

/// An ordered vertex sequence in open form (no duplicated closing vertex).
pub type Ring = Vec<Vertex>;

/// Identifies a ring inside a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RingId {
    /// The outer ring (or the line itself, or the single point)
    Outer,
    /// A polygon hole, by position in the hole list
    Hole(usize),
}

/// A finalized geometry fragment stored in the multi-geometry store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommittedPart {
    /// Outer ring, line, or single point
    pub outer: Ring,
    /// Polygon holes (empty for points and lines)
    #[serde(default)]
    pub holes: Vec<Ring>,
}

impl CommittedPart {
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole ring.
    pub fn with_hole(mut self, hole: Ring) -> Self {
        self.holes.push(hole);
        self
    }

    /// Whether the outer ring satisfies the vertex minimum of `mode`.
    pub fn is_valid(&self, mode: DrawMode) -> bool {
        match mode {
            DrawMode::Point => self.outer.len() == 1,
            _ => self.outer.len() >= mode.min_vertices(),
        }
    }
}

/// The geometry currently being drawn or edited.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSketch {
    /// Draw mode of this sketch
    pub mode: DrawMode,
    /// Outer ring (the line for Line mode, 0 or 1 vertex for Point mode)
    pub outer: Ring,
    /// Hole rings, only ever populated in Polygon mode
    pub holes: Vec<Ring>,
}

impl ActiveSketch {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            outer: Vec::new(),
            holes: Vec::new(),
        }
    }

    /// Whether nothing has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Whether the outer ring satisfies the vertex minimum.
    pub fn is_valid(&self) -> bool {
        self.to_part().is_valid(self.mode)
    }

    /// Get a ring by id.
    pub fn ring(&self, id: RingId) -> Option<&Ring> {
        match id {
            RingId::Outer => Some(&self.outer),
            RingId::Hole(i) => self.holes.get(i),
        }
    }

    /// Get a mutable ring by id.
    pub fn ring_mut(&mut self, id: RingId) -> Option<&mut Ring> {
        match id {
            RingId::Outer => Some(&mut self.outer),
            RingId::Hole(i) => self.holes.get_mut(i),
        }
    }

    /// Iterate all rings with their ids, outer first.
    pub fn rings(&self) -> impl Iterator<Item = (RingId, &Ring)> {
        std::iter::once((RingId::Outer, &self.outer)).chain(
            self.holes
                .iter()
                .enumerate()
                .map(|(i, hole)| (RingId::Hole(i), hole)),
        )
    }

    /// Freeze into a committed part.
    pub fn to_part(&self) -> CommittedPart {
        CommittedPart {
            outer: self.outer.clone(),
            holes: self.holes.clone(),
        }
    }

    /// Replace contents with a committed part. Holes are dropped outside Polygon mode.
    pub fn load_part(&mut self, part: &CommittedPart) {
        self.outer = part.outer.clone();
        self.holes = if self.mode == DrawMode::Polygon {
            part.holes.clone()
        } else {
            Vec::new()
        };
    }

    /// Remove all vertices and holes, keeping the mode.
    pub fn clear(&mut self) {
        self.outer.clear();
        self.holes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_vertices() {
        assert_eq!(DrawMode::Point.min_vertices(), 1);
        assert_eq!(DrawMode::Line.min_vertices(), 2);
        assert_eq!(DrawMode::Polygon.min_vertices(), 3);
    }

    #[test]
    fn test_vertex_same_as_absorbs_jitter() {
        let a = Vertex::new(10.123456789, 59.987654321);
        let b = Vertex::new(10.12345679, 59.98765432);
        assert!(a.same_as(&b, 7));
        assert!(!a.same_as(&Vertex::new(10.1235, 59.9876), 7));
    }

    #[test]
    fn test_vertex_serializes_as_pair() {
        let json = serde_json::to_string(&Vertex::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Vertex = serde_json::from_str("[3.0, 4.0]").unwrap();
        assert_eq!(back, Vertex::new(3.0, 4.0));
    }

    #[test]
    fn test_point_part_validity() {
        assert!(!CommittedPart::default().is_valid(DrawMode::Point));
        assert!(CommittedPart::new(vec![Vertex::new(0.0, 0.0)]).is_valid(DrawMode::Point));
        let two = CommittedPart::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)]);
        assert!(!two.is_valid(DrawMode::Point));
        assert!(two.is_valid(DrawMode::Line));
        assert!(!two.is_valid(DrawMode::Polygon));
    }

    #[test]
    fn test_load_part_drops_holes_outside_polygon() {
        let part = CommittedPart::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)])
            .with_hole(vec![Vertex::new(0.1, 0.1)]);
        let mut sketch = ActiveSketch::new(DrawMode::Line);
        sketch.load_part(&part);
        assert_eq!(sketch.outer.len(), 2);
        assert!(sketch.holes.is_empty());
    }
}
