//! Committed parts of a multi-geometry.
//!
//! The store and the [`ActiveSketch`] share one synchronization contract: the
//! active sketch is authoritative for the part at `active_index`, and the
//! stored copy is only refreshed through [`MultiGeometryStore::commit_active`].
//! Anything that needs the full geometry goes through
//! [`MultiGeometryStore::compose`], which substitutes the live sketch.

use serde::{Deserialize, Serialize};

use crate::error::SketchError;
use crate::model::{ActiveSketch, CommittedPart};

/// Direction for stepping through the parts of a multi-geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Next,
    Previous,
}

/// Ordered collection of committed parts plus the index of the part being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiGeometryStore {
    parts: Vec<CommittedPart>,
    /// Index of the part mirrored by the active sketch. `None` while a brand
    /// new part (not yet stored) is being drawn.
    active_index: Option<usize>,
}

impl MultiGeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no part has been committed.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Stored parts in commit order.
    pub fn parts(&self) -> &[CommittedPart] {
        &self.parts
    }

    /// Index of the part mirrored by the active sketch.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Replace the store with the parts of an existing multi-geometry and
    /// load the first one into `active`.
    pub fn seed(&mut self, parts: Vec<CommittedPart>, active: &mut ActiveSketch) {
        self.parts = parts;
        self.active_index = None;
        if !self.parts.is_empty() {
            // Cannot fail on a non-empty store
            let _ = self.load_part(0, active);
        }
    }

    /// Write the active sketch back into the store.
    ///
    /// Overwrites the part at `active_index`, or appends when the active
    /// sketch is a new part. Returns the index written.
    pub fn commit_active(&mut self, active: &ActiveSketch) -> usize {
        let part = active.to_part();
        let index = match self.active_index {
            Some(i) if i < self.parts.len() => {
                self.parts[i] = part;
                i
            }
            _ => {
                self.parts.push(part);
                self.parts.len() - 1
            }
        };
        self.active_index = Some(index);
        log::debug!("📦 Committed part {} of {}", index + 1, self.parts.len());
        index
    }

    /// Detach the active sketch from the store so it becomes a new part.
    pub fn start_new_part(&mut self) {
        self.active_index = None;
    }

    /// Copy the part at `index` into `active`. Indexes wrap around.
    pub fn load_part(&mut self, index: usize, active: &mut ActiveSketch) -> Result<usize, SketchError> {
        if self.parts.is_empty() {
            return Err(SketchError::InvalidState("no committed parts to load"));
        }
        let index = index % self.parts.len();
        active.load_part(&self.parts[index]);
        self.active_index = Some(index);
        Ok(index)
    }

    /// Commit the active sketch, then load the neighbouring part.
    ///
    /// Wraps circularly: next from the last part goes to the first, previous
    /// from the first goes to the last.
    pub fn navigate(
        &mut self,
        direction: NavDirection,
        active: &mut ActiveSketch,
    ) -> Result<usize, SketchError> {
        let pending_new = self.active_index.is_none() && !active.is_empty();
        if self.parts.len() + usize::from(pending_new) < 2 {
            return Err(SketchError::InvalidState("multi-geometry has a single part"));
        }

        let current = if self.active_index.is_none() && active.is_empty() {
            self.parts.len() - 1
        } else {
            self.commit_active(active)
        };
        let len = self.parts.len();
        let target = match direction {
            NavDirection::Next => (current + 1) % len,
            NavDirection::Previous => (current + len - 1) % len,
        };
        let index = self.load_part(target, active)?;
        log::debug!("🔀 Navigated {:?} to part {} of {}", direction, index + 1, len);
        Ok(index)
    }

    /// All parts in commit order with the live sketch substituted for (or
    /// appended as) the active part.
    pub fn compose(&self, active: &ActiveSketch) -> Vec<CommittedPart> {
        let mut parts = self.parts.clone();
        match self.active_index {
            Some(i) if i < parts.len() => parts[i] = active.to_part(),
            _ if !active.is_empty() => parts.push(active.to_part()),
            _ => {}
        }
        parts
    }

    /// Zero-based position of the active part and the total part count.
    pub fn position(&self, active: &ActiveSketch) -> Option<(usize, usize)> {
        match self.active_index {
            Some(i) => Some((i, self.parts.len())),
            None if self.parts.is_empty() => None,
            None if active.is_empty() => Some((self.parts.len() - 1, self.parts.len())),
            None => Some((self.parts.len(), self.parts.len() + 1)),
        }
    }

    /// Remove all parts.
    pub fn clear(&mut self) {
        self.parts.clear();
        self.active_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawMode, Vertex};

    fn point_part(x: f64) -> CommittedPart {
        CommittedPart::new(vec![Vertex::new(x, 0.0)])
    }

    fn seeded(n: usize) -> (MultiGeometryStore, ActiveSketch) {
        let mut store = MultiGeometryStore::new();
        let mut active = ActiveSketch::new(DrawMode::Point);
        store.seed((0..n).map(|i| point_part(i as f64)).collect(), &mut active);
        (store, active)
    }

    #[test]
    fn test_seed_loads_first_part() {
        let (store, active) = seeded(3);
        assert_eq!(store.active_index(), Some(0));
        assert_eq!(active.outer, vec![Vertex::new(0.0, 0.0)]);
        assert_eq!(store.position(&active), Some((0, 3)));
    }

    #[test]
    fn test_navigate_wraps() {
        let (mut store, mut active) = seeded(3);
        assert_eq!(store.navigate(NavDirection::Previous, &mut active), Ok(2));
        assert_eq!(active.outer[0].x, 2.0);
        assert_eq!(store.navigate(NavDirection::Next, &mut active), Ok(0));
        assert_eq!(active.outer[0].x, 0.0);
    }

    #[test]
    fn test_navigate_commits_edits() {
        let (mut store, mut active) = seeded(2);
        active.outer[0] = Vertex::new(42.0, 0.0);
        store.navigate(NavDirection::Next, &mut active).unwrap();
        assert_eq!(store.parts()[0].outer[0].x, 42.0);
    }

    #[test]
    fn test_navigate_single_part_refused() {
        let (mut store, mut active) = seeded(1);
        assert!(store.navigate(NavDirection::Next, &mut active).is_err());
        assert_eq!(store.active_index(), Some(0));
    }

    #[test]
    fn test_compose_appends_new_part_last() {
        let mut store = MultiGeometryStore::new();
        let mut active = ActiveSketch::new(DrawMode::Point);
        for x in [1.0, 2.0] {
            active.outer = vec![Vertex::new(x, 0.0)];
            store.commit_active(&active);
            store.start_new_part();
            active.clear();
        }
        active.outer = vec![Vertex::new(3.0, 0.0)];
        let parts = store.compose(&active);
        let xs: Vec<f64> = parts.iter().map(|p| p.outer[0].x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(store.position(&active), Some((2, 3)));
    }

    #[test]
    fn test_compose_substitutes_live_sketch() {
        let (store, mut active) = seeded(2);
        active.outer[0] = Vertex::new(9.0, 9.0);
        let parts = store.compose(&active);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].outer[0], Vertex::new(9.0, 9.0));
        // Store itself untouched until commit
        assert_eq!(store.parts()[0].outer[0], Vertex::new(0.0, 0.0));
    }
}
