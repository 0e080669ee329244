//! The sketch state machine.
//!
//! All mutation of the active sketch goes through [`SketchSession::handle`],
//! one [`SketchEvent`] at a time. The session has no knowledge of the
//! rendering surface; screen-space rules receive the viewport inside the
//! event that needs it.

use serde::Serialize;

use super::multi::{MultiGeometryStore, NavDirection};
use crate::error::SketchError;
use crate::geometry::{self, Geometry};
use crate::model::{ActiveSketch, CommittedPart, DrawMode, MIN_POLYGON_VERTICES, Ring, RingId, Vertex};
use crate::viewport::Viewport;

/// Where the session is in the interaction protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SketchPhase {
    /// No sketch in progress
    #[default]
    Idle,
    /// Placing vertices of the active ring
    Sketching,
    /// The active sketch is complete and editable through handles
    Finalized,
    /// Placing vertices of a new hole; outer ring and holes are frozen
    SketchingHole,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchEvent {
    /// Clear everything and begin a new sketch.
    Start { mode: DrawMode, multi_capable: bool },
    /// Replace the sketch with existing parts and finalize it.
    Load { parts: Vec<CommittedPart> },
    /// Primary click on the map (not on a handle).
    Click { at: Vertex, viewport: Viewport },
    /// Double click: finalize the sketch or the hole draft.
    DoubleClick,
    /// Explicit finalize request.
    Finalize,
    /// Pop the last placed vertex while sketching.
    RemoveLastVertex,
    /// Begin a GPS track part, continuing a multi-geometry where possible.
    BeginTrack { mode: DrawMode, multi_capable: bool },
    /// Append a recorded GPS position, without the proximity-close rule.
    AppendTrackPoint(Vertex),
    /// Throw away the active part.
    DiscardActive,
    /// Move a vertex of a finalized ring.
    MoveVertex { ring: RingId, index: usize, to: Vertex },
    /// Insert a vertex into a finalized ring before `index`.
    InsertVertex { ring: RingId, index: usize, at: Vertex },
    /// Remove a vertex from a finalized ring.
    DeleteVertex { ring: RingId, index: usize },
    StartHole,
    FinishHole,
    CancelHole,
    RemoveLastHole,
    /// Step to another part of the multi-geometry.
    Navigate(NavDirection),
    /// Drop everything and return to idle.
    Cancel,
}

/// Restorable copy of the session's mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchSnapshot {
    phase: SketchPhase,
    sketch: Option<ActiveSketch>,
    hole_draft: Ring,
    store: MultiGeometryStore,
}

/// Owner of the active sketch, the hole draft and the multi-geometry store.
#[derive(Debug, Clone)]
pub struct SketchSession {
    phase: SketchPhase,
    sketch: Option<ActiveSketch>,
    hole_draft: Ring,
    store: MultiGeometryStore,
    multi_capable: bool,
    close_threshold_px: f64,
    precision: u32,
}

impl SketchSession {
    pub fn new(close_threshold_px: f64, precision: u32) -> Self {
        Self {
            phase: SketchPhase::Idle,
            sketch: None,
            hole_draft: Vec::new(),
            store: MultiGeometryStore::new(),
            multi_capable: false,
            close_threshold_px,
            precision,
        }
    }

    pub fn phase(&self) -> SketchPhase {
        self.phase
    }

    pub fn mode(&self) -> Option<DrawMode> {
        self.sketch.as_ref().map(|s| s.mode)
    }

    pub fn sketch(&self) -> Option<&ActiveSketch> {
        self.sketch.as_ref()
    }

    pub fn hole_draft(&self) -> &[Vertex] {
        &self.hole_draft
    }

    pub fn store(&self) -> &MultiGeometryStore {
        &self.store
    }

    pub fn is_multi_capable(&self) -> bool {
        self.multi_capable
    }

    /// Coordinate precision used for assembly.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Zero-based position of the active part and the part total.
    pub fn multi_position(&self) -> Option<(usize, usize)> {
        self.sketch.as_ref().and_then(|s| self.store.position(s))
    }

    /// Assemble the current geometry from the store and the live sketch.
    pub fn assemble(&self) -> Option<Geometry> {
        let sketch = self.sketch.as_ref()?;
        let parts = self.store.compose(sketch);
        geometry::assemble(sketch.mode, &parts, self.precision)
    }

    /// Assemble only the part currently being drawn or edited.
    pub fn assemble_active(&self) -> Option<Geometry> {
        let sketch = self.sketch.as_ref()?;
        geometry::assemble(sketch.mode, &[sketch.to_part()], self.precision)
    }

    pub fn snapshot(&self) -> SketchSnapshot {
        SketchSnapshot {
            phase: self.phase,
            sketch: self.sketch.clone(),
            hole_draft: self.hole_draft.clone(),
            store: self.store.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: SketchSnapshot) {
        self.phase = snapshot.phase;
        self.sketch = snapshot.sketch;
        self.hole_draft = snapshot.hole_draft;
        self.store = snapshot.store;
    }

    /// Finalize what can be finalized and return the assembled geometry.
    ///
    /// On success the session returns to idle. When nothing valid can be
    /// assembled the session is left untouched so the user can keep drawing.
    pub fn finish(&mut self) -> Option<Geometry> {
        let before = self.snapshot();
        match self.phase {
            SketchPhase::Sketching => {
                let _ = self.finalize();
            }
            SketchPhase::SketchingHole => {
                if self.finish_hole().is_err() {
                    self.hole_draft.clear();
                    self.phase = SketchPhase::Finalized;
                }
            }
            _ => {}
        }

        match self.assemble() {
            Some(geometry) => {
                self.reset();
                Some(geometry)
            }
            None => {
                self.restore(before);
                None
            }
        }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: SketchEvent) -> Result<(), SketchError> {
        match event {
            SketchEvent::Start {
                mode,
                multi_capable,
            } => {
                self.reset();
                self.multi_capable = multi_capable;
                self.sketch = Some(ActiveSketch::new(mode));
                self.phase = SketchPhase::Sketching;
                log::debug!("✏️ Started {} sketch (multi={})", mode.name(), multi_capable);
                Ok(())
            }
            SketchEvent::Load { parts } => self.load(parts),
            SketchEvent::Click { at, viewport } => self.click(at, &viewport),
            SketchEvent::DoubleClick => match self.phase {
                SketchPhase::Sketching => self.finalize(),
                SketchPhase::SketchingHole => self.finish_hole(),
                _ => Err(SketchError::InvalidState("nothing to finish")),
            },
            SketchEvent::Finalize => self.finalize(),
            SketchEvent::RemoveLastVertex => self.remove_last_vertex(),
            SketchEvent::BeginTrack {
                mode,
                multi_capable,
            } => {
                let continue_multi = self.phase == SketchPhase::Finalized
                    && self.multi_capable
                    && self.mode() == Some(mode);
                if continue_multi {
                    self.begin_new_part()
                } else {
                    self.handle(SketchEvent::Start {
                        mode,
                        multi_capable,
                    })
                }
            }
            SketchEvent::AppendTrackPoint(at) => {
                let sketch = self.sketching_mut()?;
                sketch.outer.push(at);
                log::trace!("🛰️ Track vertex {} at ({:.6}, {:.6})", sketch.outer.len(), at.x, at.y);
                Ok(())
            }
            SketchEvent::DiscardActive => self.discard_active(),
            SketchEvent::MoveVertex { ring, index, to } => {
                let target = self.finalized_ring_mut(ring)?;
                let vertex = target
                    .get_mut(index)
                    .ok_or(SketchError::InvalidState("vertex index out of range"))?;
                *vertex = to;
                log::trace!("Moved {:?}[{}] to ({:.6}, {:.6})", ring, index, to.x, to.y);
                Ok(())
            }
            SketchEvent::InsertVertex { ring, index, at } => {
                if self.mode() == Some(DrawMode::Point) {
                    return Err(SketchError::InvalidState("points have no segments"));
                }
                let target = self.finalized_ring_mut(ring)?;
                if index > target.len() {
                    return Err(SketchError::InvalidState("insert index out of range"));
                }
                target.insert(index, at);
                log::debug!("➕ Inserted vertex into {:?} at index {}", ring, index);
                Ok(())
            }
            SketchEvent::DeleteVertex { ring, index } => self.delete_vertex(ring, index),
            SketchEvent::StartHole => {
                if self.phase != SketchPhase::Finalized || self.mode() != Some(DrawMode::Polygon) {
                    return Err(SketchError::InvalidState("holes need a finalized polygon"));
                }
                self.hole_draft.clear();
                self.phase = SketchPhase::SketchingHole;
                log::debug!("🕳️ Started hole");
                Ok(())
            }
            SketchEvent::FinishHole => self.finish_hole(),
            SketchEvent::CancelHole => {
                if self.phase != SketchPhase::SketchingHole {
                    return Err(SketchError::InvalidState("no hole in progress"));
                }
                self.hole_draft.clear();
                self.phase = SketchPhase::Finalized;
                log::debug!("❌ Hole cancelled");
                Ok(())
            }
            SketchEvent::RemoveLastHole => {
                if self.phase != SketchPhase::Finalized {
                    return Err(SketchError::InvalidState("sketch is not finalized"));
                }
                let sketch = self
                    .sketch
                    .as_mut()
                    .ok_or(SketchError::InvalidState("no sketch"))?;
                sketch
                    .holes
                    .pop()
                    .ok_or(SketchError::InvalidState("no hole to remove"))?;
                log::debug!("🗑️ Removed last hole, {} left", sketch.holes.len());
                Ok(())
            }
            SketchEvent::Navigate(direction) => {
                if self.phase != SketchPhase::Finalized {
                    return Err(SketchError::InvalidState("finish the current part first"));
                }
                let sketch = self
                    .sketch
                    .as_mut()
                    .ok_or(SketchError::InvalidState("no sketch"))?;
                self.store.navigate(direction, sketch)?;
                Ok(())
            }
            SketchEvent::Cancel => {
                self.reset();
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        self.phase = SketchPhase::Idle;
        self.sketch = None;
        self.hole_draft.clear();
        self.store.clear();
        self.multi_capable = false;
    }

    fn load(&mut self, mut parts: Vec<CommittedPart>) -> Result<(), SketchError> {
        let sketch = self
            .sketch
            .as_mut()
            .ok_or(SketchError::InvalidState("start a sketch before loading"))?;
        let mode = sketch.mode;
        parts.retain(|p| p.is_valid(mode));
        if parts.is_empty() {
            return Err(SketchError::insufficient(mode, 0));
        }

        self.store.clear();
        sketch.clear();
        if self.multi_capable && parts.len() > 1 {
            self.store.seed(parts, sketch);
        } else {
            sketch.load_part(&parts[0]);
        }
        self.hole_draft.clear();
        self.phase = SketchPhase::Finalized;
        log::debug!("📥 Loaded {} part(s) into {} sketch", self.store.len().max(1), mode.name());
        Ok(())
    }

    fn click(&mut self, at: Vertex, viewport: &Viewport) -> Result<(), SketchError> {
        match self.phase {
            SketchPhase::Idle => Err(SketchError::InvalidState("no sketch started")),
            SketchPhase::Sketching => self.add_vertex(at, viewport),
            SketchPhase::Finalized if self.multi_capable => {
                self.begin_new_part()?;
                self.add_vertex(at, viewport)
            }
            SketchPhase::Finalized => Err(SketchError::InvalidState("sketch already finalized")),
            SketchPhase::SketchingHole => {
                if self.is_close_gesture(self.hole_draft.last(), &at, viewport) {
                    return self.finish_hole();
                }
                self.hole_draft.push(at);
                log::debug!("🕳️ Hole vertex {} at ({:.6}, {:.6})", self.hole_draft.len(), at.x, at.y);
                Ok(())
            }
        }
    }

    fn is_close_gesture(&self, last: Option<&Vertex>, at: &Vertex, viewport: &Viewport) -> bool {
        last.is_some_and(|last| viewport.screen_distance(last, at) <= self.close_threshold_px)
    }

    fn add_vertex(&mut self, at: Vertex, viewport: &Viewport) -> Result<(), SketchError> {
        let close = {
            let sketch = self.sketching_mut()?;
            if sketch.mode == DrawMode::Point {
                sketch.outer = vec![at];
                None
            } else {
                Some(sketch.outer.last().copied())
            }
        };

        match close {
            None => self.finalize(),
            Some(last) if self.is_close_gesture(last.as_ref(), &at, viewport) => {
                log::debug!("🎯 Click near last vertex, finalizing");
                self.finalize()
            }
            Some(_) => {
                let sketch = self.sketching_mut()?;
                sketch.outer.push(at);
                log::debug!("✏️ Vertex {} at ({:.6}, {:.6})", sketch.outer.len(), at.x, at.y);
                Ok(())
            }
        }
    }

    fn finalize(&mut self) -> Result<(), SketchError> {
        if self.phase == SketchPhase::SketchingHole {
            return self.finish_hole();
        }
        let sketch = self.sketching_mut()?;
        if !sketch.is_valid() {
            return Err(SketchError::insufficient(sketch.mode, sketch.outer.len()));
        }
        let (mode, count) = (sketch.mode, sketch.outer.len());
        self.phase = SketchPhase::Finalized;
        log::info!("✅ Finalized {} sketch with {} vertices", mode.name(), count);
        Ok(())
    }

    fn begin_new_part(&mut self) -> Result<(), SketchError> {
        let sketch = self
            .sketch
            .as_mut()
            .ok_or(SketchError::InvalidState("no sketch"))?;
        if sketch.is_valid() {
            self.store.commit_active(sketch);
        }
        self.store.start_new_part();
        sketch.clear();
        self.phase = SketchPhase::Sketching;
        log::debug!("🆕 Started part {}", self.store.len() + 1);
        Ok(())
    }

    fn remove_last_vertex(&mut self) -> Result<(), SketchError> {
        let ring = match self.phase {
            SketchPhase::Sketching => &mut self.sketching_mut()?.outer,
            SketchPhase::SketchingHole => &mut self.hole_draft,
            _ => return Err(SketchError::InvalidState("not placing vertices")),
        };
        ring.pop()
            .ok_or(SketchError::InvalidState("no vertex to remove"))?;
        log::debug!("↩️ Removed last vertex, {} left", ring.len());
        Ok(())
    }

    fn discard_active(&mut self) -> Result<(), SketchError> {
        let sketch = self
            .sketch
            .as_mut()
            .ok_or(SketchError::InvalidState("no sketch"))?;
        sketch.clear();
        self.hole_draft.clear();
        if self.store.is_empty() {
            self.phase = SketchPhase::Sketching;
        } else {
            let last = self.store.active_index().unwrap_or(self.store.len() - 1);
            self.store.load_part(last, sketch)?;
            self.phase = SketchPhase::Finalized;
        }
        log::debug!("🗑️ Discarded active part");
        Ok(())
    }

    fn delete_vertex(&mut self, ring: RingId, index: usize) -> Result<(), SketchError> {
        let mode = self.mode().ok_or(SketchError::InvalidState("no sketch"))?;
        let minimum = match ring {
            RingId::Outer => mode.min_vertices(),
            RingId::Hole(_) => MIN_POLYGON_VERTICES,
        };
        let target = self.finalized_ring_mut(ring)?;
        if index >= target.len() {
            return Err(SketchError::InvalidState("vertex index out of range"));
        }
        if target.len() <= minimum {
            log::warn!(
                "Refusing to delete vertex: {:?} would drop below {} vertices",
                ring,
                minimum
            );
            return Err(SketchError::InsufficientVertices {
                mode,
                required: minimum,
                actual: target.len() - 1,
            });
        }
        target.remove(index);
        log::debug!("➖ Deleted {:?}[{}], {} left", ring, index, target.len());
        Ok(())
    }

    fn finish_hole(&mut self) -> Result<(), SketchError> {
        if self.phase != SketchPhase::SketchingHole {
            return Err(SketchError::InvalidState("no hole in progress"));
        }
        if self.hole_draft.len() < MIN_POLYGON_VERTICES {
            return Err(SketchError::insufficient(DrawMode::Polygon, self.hole_draft.len()));
        }
        let hole = std::mem::take(&mut self.hole_draft);
        let sketch = self
            .sketch
            .as_mut()
            .ok_or(SketchError::InvalidState("no sketch"))?;
        sketch.holes.push(hole);
        self.phase = SketchPhase::Finalized;
        log::info!("✅ Added hole {}", sketch.holes.len());
        Ok(())
    }

    fn sketching_mut(&mut self) -> Result<&mut ActiveSketch, SketchError> {
        if self.phase != SketchPhase::Sketching {
            return Err(SketchError::InvalidState("not sketching"));
        }
        self.sketch
            .as_mut()
            .ok_or(SketchError::InvalidState("no sketch"))
    }

    fn finalized_ring_mut(&mut self, ring: RingId) -> Result<&mut Ring, SketchError> {
        if self.phase != SketchPhase::Finalized {
            return Err(SketchError::InvalidState("vertices are only editable after finalize"));
        }
        self.sketch
            .as_mut()
            .and_then(|s| s.ring_mut(ring))
            .ok_or(SketchError::InvalidState("no such ring"))
    }
}
