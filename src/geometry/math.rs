//! Pure geometry helpers: rounding, ring closing, GeoJSON assembly,
//! normalization and seed extraction.
//!
//! Nothing in here touches session state; every function takes its inputs
//! by reference and returns a fresh value.

use super::Geometry;
use crate::error::SketchError;
use crate::model::{CommittedPart, DrawMode, MIN_POLYGON_VERTICES, Ring, Vertex};

/// Round a coordinate to `precision` decimals.
pub fn round_coord(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    // Adding 0.0 folds -0.0 into 0.0
    (value * factor).round() / factor + 0.0
}

/// Round every vertex of a ring.
pub fn round_ring(ring: &[Vertex], precision: u32) -> Ring {
    ring.iter().map(|v| v.rounded(precision)).collect()
}

/// Drop duplicated closing vertices so the ring is in open (editable) form.
pub fn open_ring(ring: &[Vertex], precision: u32) -> Ring {
    let mut open = ring.to_vec();
    while open.len() > 1 {
        match (open.first(), open.last()) {
            (Some(first), Some(last)) if first.same_as(last, precision) => {
                open.pop();
            }
            _ => break,
        }
    }
    open
}

/// Append a copy of the first vertex unless the ring is already closed.
pub fn close_ring(ring: &[Vertex], precision: u32) -> Ring {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if ring.len() == 1 || !first.same_as(last, precision) {
            closed.push(*first);
        }
    }
    closed
}

fn polygon_rings(part: &CommittedPart, precision: u32) -> Vec<Vec<Vertex>> {
    std::iter::once(&part.outer)
        .chain(
            part.holes
                .iter()
                .filter(|hole| hole.len() >= MIN_POLYGON_VERTICES),
        )
        .map(|ring| close_ring(ring, precision))
        .collect()
}

/// Assemble the output geometry for `mode` from parts in commit order.
///
/// Invalid parts are skipped. One remaining part yields the plain type, more
/// than one yields the Multi* variant, none yields `None`.
pub fn assemble(mode: DrawMode, parts: &[CommittedPart], precision: u32) -> Option<Geometry> {
    let valid: Vec<&CommittedPart> = parts.iter().filter(|p| p.is_valid(mode)).collect();
    let multi = match valid.len() {
        0 => return None,
        1 => false,
        _ => true,
    };

    let geometry = match (mode, multi) {
        (DrawMode::Point, false) => Geometry::Point {
            coordinates: valid[0].outer[0],
        },
        (DrawMode::Point, true) => Geometry::MultiPoint {
            coordinates: valid.iter().map(|p| p.outer[0]).collect(),
        },
        (DrawMode::Line, false) => Geometry::LineString {
            coordinates: valid[0].outer.clone(),
        },
        (DrawMode::Line, true) => Geometry::MultiLineString {
            coordinates: valid.iter().map(|p| p.outer.clone()).collect(),
        },
        (DrawMode::Polygon, false) => Geometry::Polygon {
            coordinates: polygon_rings(valid[0], precision),
        },
        (DrawMode::Polygon, true) => Geometry::MultiPolygon {
            coordinates: valid.iter().map(|p| polygon_rings(p, precision)).collect(),
        },
    };
    Some(geometry)
}

/// Bring a polygon's rings into comparable form: rounded, then re-closed.
fn normalize_polygon(rings: &[Vec<Vertex>], precision: u32) -> Vec<Vec<Vertex>> {
    rings
        .iter()
        .map(|ring| {
            let open = open_ring(&round_ring(ring, precision), precision);
            close_ring(&open, precision)
        })
        .collect()
}

/// Canonical comparable form of a geometry.
///
/// Coordinates are rounded to `precision`, polygon rings are closed exactly
/// once, and single-part Multi* geometries collapse to their plain variant.
/// Part order is kept as given.
pub fn normalize(geometry: &Geometry, precision: u32) -> Geometry {
    match geometry {
        Geometry::Point { coordinates } => Geometry::Point {
            coordinates: coordinates.rounded(precision),
        },
        Geometry::MultiPoint { coordinates } if coordinates.len() == 1 => Geometry::Point {
            coordinates: coordinates[0].rounded(precision),
        },
        Geometry::MultiPoint { coordinates } => Geometry::MultiPoint {
            coordinates: round_ring(coordinates, precision),
        },
        Geometry::LineString { coordinates } => Geometry::LineString {
            coordinates: round_ring(coordinates, precision),
        },
        Geometry::MultiLineString { coordinates } if coordinates.len() == 1 => {
            Geometry::LineString {
                coordinates: round_ring(&coordinates[0], precision),
            }
        }
        Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
            coordinates: coordinates
                .iter()
                .map(|line| round_ring(line, precision))
                .collect(),
        },
        Geometry::Polygon { coordinates } => Geometry::Polygon {
            coordinates: normalize_polygon(coordinates, precision),
        },
        Geometry::MultiPolygon { coordinates } if coordinates.len() == 1 => Geometry::Polygon {
            coordinates: normalize_polygon(&coordinates[0], precision),
        },
        Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
            coordinates: coordinates
                .iter()
                .map(|polygon| normalize_polygon(polygon, precision))
                .collect(),
        },
    }
}

/// Map any geometry onto editable parts for `mode`.
///
/// A geometry of another type contributes a representative sub-geometry:
/// its first vertex for Point mode, its rings as lines for Line mode, and
/// lines with enough vertices as outer rings for Polygon mode. Rings come
/// back in open form.
pub fn parts_for_mode(
    geometry: &Geometry,
    mode: DrawMode,
    precision: u32,
) -> Result<Vec<CommittedPart>, SketchError> {
    let source = geometry.to_parts();
    let source_mode = geometry.draw_mode();

    let parts: Vec<CommittedPart> = match (mode, source_mode) {
        (DrawMode::Point, DrawMode::Point) => source,
        (DrawMode::Point, _) => source
            .iter()
            .find_map(|p| p.outer.first())
            .map(|v| vec![CommittedPart::new(vec![*v])])
            .unwrap_or_default(),
        (DrawMode::Line, DrawMode::Point) => {
            let line: Ring = source.iter().filter_map(|p| p.outer.first().copied()).collect();
            vec![CommittedPart::new(line)]
        }
        (DrawMode::Line, DrawMode::Line) => source,
        (DrawMode::Line, DrawMode::Polygon) => source
            .into_iter()
            .map(|p| CommittedPart::new(close_ring(&p.outer, precision)))
            .collect(),
        (DrawMode::Polygon, DrawMode::Point) => {
            let ring: Ring = source.iter().filter_map(|p| p.outer.first().copied()).collect();
            vec![CommittedPart::new(open_ring(&ring, precision))]
        }
        (DrawMode::Polygon, _) => source
            .into_iter()
            .map(|p| CommittedPart {
                outer: open_ring(&p.outer, precision),
                holes: p
                    .holes
                    .iter()
                    .map(|h| open_ring(h, precision))
                    .filter(|h| h.len() >= MIN_POLYGON_VERTICES)
                    .collect(),
            })
            .collect(),
    };

    let parts: Vec<CommittedPart> = parts.into_iter().filter(|p| p.is_valid(mode)).collect();
    if parts.is_empty() {
        return Err(SketchError::UnsupportedSeedGeometry {
            mode,
            geometry_type: geometry.type_name(),
        });
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u32 = 7;

    fn v(x: f64, y: f64) -> Vertex {
        Vertex::new(x, y)
    }

    fn square() -> Ring {
        vec![v(0.0, 0.0), v(4.0, 0.0), v(4.0, 4.0), v(0.0, 4.0)]
    }

    #[test]
    fn test_round_coord() {
        assert_eq!(round_coord(1.23456789, 3), 1.235);
        assert_eq!(round_coord(-0.00000001, 3), 0.0);
        assert!(round_coord(-0.00000001, 3).is_sign_positive());
    }

    #[test]
    fn test_close_ring_idempotent() {
        let closed = close_ring(&square(), P);
        assert_eq!(closed.len(), 5);
        assert_eq!(closed.first(), closed.last());
        assert_eq!(close_ring(&closed, P), closed);

        let line = vec![v(0.0, 0.0), v(1.0, 1.0)];
        let closed = close_ring(&line, P);
        assert_eq!(close_ring(&closed, P), closed);
    }

    #[test]
    fn test_open_ring_strips_closing_vertex() {
        let closed = close_ring(&square(), P);
        assert_eq!(open_ring(&closed, P), square());
        assert_eq!(open_ring(&square(), P), square());
    }

    #[test]
    fn test_assemble_single_and_multi() {
        let line = CommittedPart::new(vec![v(0.0, 0.0), v(1.0, 1.0)]);
        let single = assemble(DrawMode::Line, &[line.clone()], P).unwrap();
        assert_eq!(single.type_name(), "LineString");

        let multi = assemble(DrawMode::Line, &[line.clone(), line], P).unwrap();
        assert_eq!(multi.type_name(), "MultiLineString");
    }

    #[test]
    fn test_assemble_skips_invalid_parts() {
        let short = CommittedPart::new(vec![v(0.0, 0.0), v(1.0, 1.0)]);
        let poly = CommittedPart::new(square());
        let geometry = assemble(DrawMode::Polygon, &[short.clone(), poly], P).unwrap();
        assert_eq!(geometry.type_name(), "Polygon");
        assert!(assemble(DrawMode::Polygon, &[short], P).is_none());
        assert!(assemble(DrawMode::Point, &[], P).is_none());
    }

    #[test]
    fn test_assemble_closes_every_ring() {
        let part = CommittedPart::new(square()).with_hole(vec![v(1.0, 1.0), v(2.0, 1.0), v(2.0, 2.0)]);
        let Some(Geometry::Polygon { coordinates }) = assemble(DrawMode::Polygon, &[part.clone()], P)
        else {
            panic!("Expected Polygon");
        };
        assert_eq!(coordinates.len(), 2);
        for ring in &coordinates {
            assert_eq!(ring.first(), ring.last());
        }
        // Live ring untouched
        assert_eq!(part.outer.len(), 4);
    }

    #[test]
    fn test_normalize_idempotent_and_closing_insensitive() {
        let open = Geometry::Polygon {
            coordinates: vec![vec![v(0.000000011, 0.0), v(4.0, 0.0), v(4.0, 4.0)]],
        };
        let closed = Geometry::Polygon {
            coordinates: vec![vec![v(0.0, 0.0), v(4.0, 0.0), v(4.0, 4.0), v(0.0, 0.0)]],
        };
        let n = normalize(&open, P);
        assert_eq!(normalize(&n, P), n);
        assert_eq!(n, normalize(&closed, P));
    }

    #[test]
    fn test_normalize_collapses_single_part_multi() {
        let multi = Geometry::MultiLineString {
            coordinates: vec![vec![v(0.0, 0.0), v(1.0, 1.0)]],
        };
        assert_eq!(normalize(&multi, P).type_name(), "LineString");
    }

    #[test]
    fn test_parts_for_mode_cross_type() {
        let polygon = Geometry::Polygon {
            coordinates: vec![close_ring(&square(), P)],
        };

        let points = parts_for_mode(&polygon, DrawMode::Point, P).unwrap();
        assert_eq!(points, vec![CommittedPart::new(vec![v(0.0, 0.0)])]);

        let lines = parts_for_mode(&polygon, DrawMode::Line, P).unwrap();
        assert_eq!(lines[0].outer.len(), 5);

        let polys = parts_for_mode(&polygon, DrawMode::Polygon, P).unwrap();
        assert_eq!(polys[0].outer, square());
    }

    #[test]
    fn test_parts_for_mode_unsupported() {
        let point = Geometry::Point {
            coordinates: v(1.0, 1.0),
        };
        let err = parts_for_mode(&point, DrawMode::Line, P).unwrap_err();
        assert!(matches!(err, SketchError::UnsupportedSeedGeometry { .. }));

        let empty = Geometry::MultiPoint { coordinates: vec![] };
        assert!(parts_for_mode(&empty, DrawMode::Point, P).is_err());
    }
}
