//! Change detection for edits of pre-existing features.

use crate::geometry::{self, Geometry};
use crate::model::{CommittedPart, DrawMode};

/// Baseline of a feature being edited.
///
/// The original geometry is kept verbatim; comparisons use its normalized
/// form so that closing vertices, single-part Multi* wrappers and
/// floating-point noise below the precision do not count as changes.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    original: Geometry,
    baseline: Geometry,
    multi_capable: bool,
    precision: u32,
}

impl EditSession {
    /// Snapshot `geometry` as the baseline.
    pub fn start(geometry: &Geometry, multi_capable: bool, precision: u32) -> Self {
        log::info!(
            "📝 Editing {} with {} part(s)",
            geometry.type_name(),
            geometry.part_count()
        );
        Self {
            original: geometry.clone(),
            baseline: geometry::normalize(geometry, precision),
            multi_capable,
            precision,
        }
    }

    /// The geometry as it was handed in.
    pub fn original(&self) -> &Geometry {
        &self.original
    }

    /// Normalized form of the original.
    pub fn baseline(&self) -> &Geometry {
        &self.baseline
    }

    /// Draw mode derived from the original geometry type.
    pub fn mode(&self) -> DrawMode {
        self.original.draw_mode()
    }

    pub fn is_multi_capable(&self) -> bool {
        self.multi_capable
    }

    /// Editable parts of the original geometry.
    pub fn parts(&self) -> Vec<CommittedPart> {
        geometry::parts_for_mode(&self.original, self.mode(), self.precision).unwrap_or_default()
    }

    /// Whether `current` differs from the original.
    ///
    /// `None` (nothing valid left to save) always counts as a change.
    pub fn has_changes(&self, current: Option<&Geometry>) -> bool {
        match current {
            Some(geometry) => geometry::normalize(geometry, self.precision) != self.baseline,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;

    fn polygon(offset: f64) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                Vertex::new(0.0 + offset, 0.0),
                Vertex::new(4.0, 0.0),
                Vertex::new(4.0, 4.0),
                Vertex::new(0.0 + offset, 0.0),
            ]],
        }
    }

    #[test]
    fn test_unchanged_geometry() {
        let edit = EditSession::start(&polygon(0.0), false, 7);
        assert!(!edit.has_changes(Some(&polygon(0.0))));
    }

    #[test]
    fn test_open_ring_matches_closed_original() {
        let edit = EditSession::start(&polygon(0.0), false, 7);
        let open = Geometry::Polygon {
            coordinates: vec![vec![
                Vertex::new(0.0, 0.0),
                Vertex::new(4.0, 0.0),
                Vertex::new(4.0, 4.0),
            ]],
        };
        assert!(!edit.has_changes(Some(&open)));
    }

    #[test]
    fn test_jitter_below_precision_ignored() {
        let edit = EditSession::start(&polygon(0.0), false, 7);
        assert!(!edit.has_changes(Some(&polygon(0.00000001))));
        assert!(edit.has_changes(Some(&polygon(0.001))));
    }

    #[test]
    fn test_single_part_multi_equals_plain() {
        let multi = Geometry::MultiPolygon {
            coordinates: vec![match polygon(0.0) {
                Geometry::Polygon { coordinates } => coordinates,
                _ => unreachable!(),
            }],
        };
        let edit = EditSession::start(&multi, true, 7);
        assert_eq!(edit.mode(), DrawMode::Polygon);
        assert!(!edit.has_changes(Some(&polygon(0.0))));
    }

    #[test]
    fn test_missing_geometry_is_a_change() {
        let edit = EditSession::start(&polygon(0.0), false, 7);
        assert!(edit.has_changes(None));
    }

    #[test]
    fn test_parts_are_open() {
        let edit = EditSession::start(&polygon(0.0), false, 7);
        let parts = edit.parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].outer.len(), 3);
    }
}
