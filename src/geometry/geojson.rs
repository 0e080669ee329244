//! GeoJSON-shaped geometry objects exchanged with the surrounding application.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::model::{CommittedPart, DrawMode, Vertex};

/// A GeoJSON geometry. Coordinates are `[x, y]` pairs; no CRS is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vertex },
    MultiPoint { coordinates: Vec<Vertex> },
    LineString { coordinates: Vec<Vertex> },
    MultiLineString { coordinates: Vec<Vec<Vertex>> },
    /// Outer ring first, then holes. Rings are closed (first == last).
    Polygon { coordinates: Vec<Vec<Vertex>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vertex>>> },
}

impl Geometry {
    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Draw mode that edits this geometry.
    pub fn draw_mode(&self) -> DrawMode {
        match self {
            Geometry::Point { .. } | Geometry::MultiPoint { .. } => DrawMode::Point,
            Geometry::LineString { .. } | Geometry::MultiLineString { .. } => DrawMode::Line,
            Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => DrawMode::Polygon,
        }
    }

    /// Whether this is one of the Multi* variants.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Geometry::MultiPoint { .. }
                | Geometry::MultiLineString { .. }
                | Geometry::MultiPolygon { .. }
        )
    }

    /// Number of parts (1 for the plain variants).
    pub fn part_count(&self) -> usize {
        match self {
            Geometry::MultiPoint { coordinates } => coordinates.len(),
            Geometry::MultiLineString { coordinates } => coordinates.len(),
            Geometry::MultiPolygon { coordinates } => coordinates.len(),
            _ => 1,
        }
    }

    /// Split into parts in the geometry's own mode, rings kept exactly as given.
    pub fn to_parts(&self) -> Vec<CommittedPart> {
        fn polygon_part(rings: &[Vec<Vertex>]) -> CommittedPart {
            let mut rings = rings.iter();
            let outer = rings.next().cloned().unwrap_or_default();
            CommittedPart {
                outer,
                holes: rings.cloned().collect(),
            }
        }

        match self {
            Geometry::Point { coordinates } => vec![CommittedPart::new(vec![*coordinates])],
            Geometry::MultiPoint { coordinates } => coordinates
                .iter()
                .map(|v| CommittedPart::new(vec![*v]))
                .collect(),
            Geometry::LineString { coordinates } => vec![CommittedPart::new(coordinates.clone())],
            Geometry::MultiLineString { coordinates } => coordinates
                .iter()
                .map(|line| CommittedPart::new(line.clone()))
                .collect(),
            Geometry::Polygon { coordinates } => vec![polygon_part(coordinates)],
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().map(|p| polygon_part(p)).collect()
            }
        }
    }

    /// Parse a geometry from a GeoJSON string.
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a compact GeoJSON string.
    pub fn to_json(&self) -> Result<String, GeometryError> {
        Ok(serde_json::to_string(self)?)
    }
}
