//! Public command surface of the sketch engine.
//!
//! [`SketchFacade`] composes the session reducer, the handle controller, the
//! GPS recorder, the edit comparator and the undo history, and keeps the
//! rendering port in sync after every command. Refusals from the lower
//! layers are logged and reported as `false` / `None`.

mod pointer;
mod status;


use serde::Serialize;

pub use pointer::{Modifiers, PointerEvent, PointerKind};
pub use status::{ListenerId, SessionStatus};

use status::Listeners;

use crate::config::SketchConfig;
use crate::edit::EditSession;
use crate::error::SketchError;
use crate::geometry::{self, Geometry};
use crate::gps::{GpsFix, GpsTrackRecorder};
use crate::history::{HistoryConfig, SketchHistory};
use crate::model::{DrawMode, Feature, LayerCapabilities, LayerDescriptor};
use crate::render::{RenderPort, VisualRole};
use crate::sketch::{
    NavDirection, SketchEvent, SketchPhase, SketchSession, SketchSnapshot, VertexHandleController,
};

/// Result of [`SketchFacade::finish`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SketchOutput {
    pub geometry: Geometry,
    /// Always true for new sketches; for edits, whether the geometry differs
    /// from the original.
    pub has_changes: bool,
}

/// The sketch engine as seen by the surrounding UI.
pub struct SketchFacade<P: RenderPort> {
    config: SketchConfig,
    port: P,
    session: SketchSession,
    handles: VertexHandleController,
    gps: GpsTrackRecorder,
    edit: Option<EditSession>,
    layer: Box<dyn LayerCapabilities>,
    /// Geometry handed in before `start`, e.g. a search result
    pending_seed: Option<Geometry>,
    history: SketchHistory,
    /// Session state at the start of a handle drag
    drag_snapshot: Option<SketchSnapshot>,
    swallow_click: bool,
    listeners: Listeners,
}

impl<P: RenderPort> SketchFacade<P> {
    pub fn new(port: P, layer: impl LayerCapabilities + 'static, config: SketchConfig) -> Self {
        Self {
            session: SketchSession::new(config.close_threshold_px, config.coordinate_precision),
            gps: GpsTrackRecorder::new(config.gps_min_distance, config.gps_max_fix_age()),
            history: SketchHistory::with_config(HistoryConfig {
                max_history: config.max_history,
            }),
            handles: VertexHandleController::new(),
            edit: None,
            layer: Box::new(layer),
            pending_seed: None,
            drag_snapshot: None,
            swallow_click: false,
            listeners: Listeners::default(),
            config,
            port,
        }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the port, e.g. to pan or zoom the view.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn session(&self) -> &SketchSession {
        &self.session
    }

    pub fn gps(&self) -> &GpsTrackRecorder {
        &self.gps
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Change the target layer. Takes effect on the next `start`.
    pub fn set_layer(&mut self, layer: impl LayerCapabilities + 'static) {
        self.layer = Box::new(layer);
    }

    /// Queue a geometry to seed the next sketch of a matching mode.
    pub fn set_pending_seed(&mut self, geometry: Geometry) {
        log::debug!("📌 Pending seed: {}", geometry.type_name());
        self.pending_seed = Some(geometry);
    }

    // ---- Drawing lifecycle ----

    /// Clear everything and start a new sketch in `mode`.
    ///
    /// A pending seed of the same mode is loaded and finalized right away.
    pub fn start(&mut self, mode: DrawMode) -> bool {
        self.reset_aux();
        let multi_capable = self.layer.supports_multi(mode);
        // Start is valid from every phase
        let _ = self.session.handle(SketchEvent::Start {
            mode,
            multi_capable,
        });

        if let Some(seed) = self.pending_seed.take() {
            if seed.draw_mode() == mode {
                match geometry::parts_for_mode(&seed, mode, self.config.coordinate_precision) {
                    Ok(parts) => {
                        if let Err(e) = self.session.handle(SketchEvent::Load { parts }) {
                            log::warn!("⚠️ Could not load pending seed: {}", e);
                        }
                    }
                    Err(e) => log::warn!("⚠️ Pending seed ignored: {}", e),
                }
            } else {
                self.pending_seed = Some(seed);
            }
        }

        log::info!("✏️ Drawing {} (multi={})", mode.name(), multi_capable);
        self.refresh();
        true
    }

    /// Drop the sketch, the multi-geometry parts, the edit baseline and any
    /// running GPS track. Safe from any state, including mid-drag.
    pub fn cancel(&mut self) {
        let _ = self.session.handle(SketchEvent::Cancel);
        self.reset_aux();
        self.port.clear_visuals();
        log::debug!("❌ Sketch cancelled");
        self.refresh();
    }

    /// Finalize and return the assembled geometry.
    ///
    /// `None` leaves the session untouched so drawing can continue.
    pub fn finish(&mut self) -> Option<SketchOutput> {
        let Some(geometry) = self.session.finish() else {
            log::warn!("⚠️ Finish produced no valid geometry");
            self.refresh();
            return None;
        };
        let has_changes = self
            .edit
            .as_ref()
            .is_none_or(|edit| edit.has_changes(Some(&geometry)));
        self.reset_aux();
        log::info!(
            "🏁 Finished {} (changes: {})",
            geometry.type_name(),
            has_changes
        );
        self.refresh();
        Some(SketchOutput {
            geometry,
            has_changes,
        })
    }

    /// Geometry the current state would produce.
    pub fn current_geometry(&self) -> Option<Geometry> {
        self.session.assemble()
    }

    pub fn remove_last_vertex(&mut self) -> bool {
        self.dispatch(SketchEvent::RemoveLastVertex, true)
    }

    // ---- Holes ----

    pub fn start_hole(&mut self) -> bool {
        self.dispatch(SketchEvent::StartHole, true)
    }

    pub fn finish_hole(&mut self) -> bool {
        self.dispatch(SketchEvent::FinishHole, true)
    }

    pub fn cancel_hole(&mut self) -> bool {
        self.dispatch(SketchEvent::CancelHole, true)
    }

    pub fn remove_last_hole(&mut self) -> bool {
        self.dispatch(SketchEvent::RemoveLastHole, true)
    }

    // ---- Editing existing features ----

    /// Load `feature` for editing on the layer described by `layer`.
    ///
    /// Multi-part editing follows the layer. A multi-part geometry on a
    /// single-geometry layer is cut down to its first part, which then
    /// counts as an unsaved change.
    pub fn start_editing_existing(&mut self, feature: &Feature, layer: &LayerDescriptor) -> bool {
        let mode = feature.geometry.draw_mode();
        let multi_capable = layer.supports_multi(mode);
        if !multi_capable && feature.geometry.part_count() > 1 {
            log::warn!(
                "⚠️ Layer '{}' holds single geometries; only the first of {} parts is editable",
                layer.name,
                feature.geometry.part_count()
            );
        }
        let edit = EditSession::start(
            &feature.geometry,
            multi_capable,
            self.config.coordinate_precision,
        );
        let parts = edit.parts();
        if parts.is_empty() {
            log::warn!(
                "⚠️ Feature on layer '{}' has no editable {} geometry",
                layer.name,
                mode.name()
            );
            return false;
        }

        self.reset_aux();
        self.layer = Box::new(layer.clone());
        let loaded = self
            .session
            .handle(SketchEvent::Start {
                mode,
                multi_capable,
            })
            .and_then(|_| self.session.handle(SketchEvent::Load { parts }));
        if let Err(e) = loaded {
            log::warn!("⚠️ Could not load feature: {}", e);
            let _ = self.session.handle(SketchEvent::Cancel);
            self.refresh();
            return false;
        }

        self.edit = Some(edit);
        self.refresh();
        true
    }

    /// Whether the current geometry differs from the edited original.
    ///
    /// Outside an edit, any drawn content counts as unsaved.
    pub fn has_unsaved_changes(&self) -> bool {
        match &self.edit {
            Some(edit) => edit.has_changes(self.session.assemble().as_ref()),
            None => self
                .session
                .sketch()
                .is_some_and(|s| !s.is_empty() || !self.session.store().is_empty()),
        }
    }

    /// Step to the next or previous part of a multi-geometry.
    pub fn navigate_multi_geometry(&mut self, direction: NavDirection) -> bool {
        self.dispatch(SketchEvent::Navigate(direction), true)
    }

    /// Replace the sketch with an externally supplied geometry.
    ///
    /// Uses the active draw mode when there is one, otherwise the mode of
    /// the geometry. Returns false and leaves the session unchanged when no
    /// usable sub-geometry can be extracted.
    pub fn apply_external_geometry(&mut self, geometry: &Geometry) -> bool {
        let mode = self.session.mode().unwrap_or_else(|| geometry.draw_mode());
        let parts =
            match geometry::parts_for_mode(geometry, mode, self.config.coordinate_precision) {
                Ok(parts) => parts,
                Err(e) => {
                    log::warn!("⚠️ External geometry rejected: {}", e);
                    return false;
                }
            };

        let before = self.session.snapshot();
        let result = if self.session.mode().is_some() {
            self.session.handle(SketchEvent::Load { parts })
        } else {
            let multi_capable = self.layer.supports_multi(mode);
            self.session
                .handle(SketchEvent::Start {
                    mode,
                    multi_capable,
                })
                .and_then(|_| self.session.handle(SketchEvent::Load { parts }))
        };
        match result {
            Ok(()) => {
                self.history.push(before);
                log::info!("📥 Applied external {} as {}", geometry.type_name(), mode.name());
                self.refresh();
                true
            }
            Err(e) => {
                log::warn!("⚠️ External geometry rejected: {}", e);
                self.session.restore(before);
                false
            }
        }
    }

    // ---- GPS tracks ----

    /// Start recording a track of `kind`, continuing the current
    /// multi-geometry when the layer allows it.
    pub fn start_track(&mut self, kind: DrawMode) -> bool {
        let seed = match self.gps.start(kind) {
            Ok(seed) => seed,
            Err(e) => {
                log::warn!("⚠️ {}", e);
                return false;
            }
        };

        let before = self.session.snapshot();
        let multi_capable = self.layer.supports_multi(kind);
        let begun = self
            .session
            .handle(SketchEvent::BeginTrack {
                mode: kind,
                multi_capable,
            })
            .and_then(|_| self.session.handle(SketchEvent::AppendTrackPoint(seed)));
        if let Err(e) = begun {
            log::warn!("⚠️ Could not begin track: {}", e);
            self.gps.reset();
            self.session.restore(before);
            return false;
        }

        self.history.push(before);
        self.refresh();
        true
    }

    pub fn pause_track(&mut self) -> bool {
        self.track_command(GpsTrackRecorder::pause)
    }

    pub fn resume_track(&mut self) -> bool {
        self.track_command(GpsTrackRecorder::resume)
    }

    /// Stop the track and finalize it.
    ///
    /// The result is the active part as the sketch holds it, which may
    /// already have been finalized by the user while recording. Returns
    /// `None` and discards the active part when it is too short for its
    /// geometry type.
    pub fn stop_track(&mut self) -> Option<Geometry> {
        if let Err(e) = self.gps.stop(self.config.coordinate_precision) {
            log::warn!("⚠️ {}", e);
            return None;
        }
        let finalized = match self.session.phase() {
            SketchPhase::Sketching => self.dispatch(SketchEvent::Finalize, true),
            SketchPhase::Finalized | SketchPhase::SketchingHole => true,
            SketchPhase::Idle => false,
        };
        match self.session.assemble_active() {
            Some(geometry) if finalized => {
                self.notify();
                Some(geometry)
            }
            _ => {
                self.dispatch(SketchEvent::DiscardActive, false);
                None
            }
        }
    }

    /// Deliver a GPS fix. Returns whether a vertex was appended.
    pub fn on_gps_fix(&mut self, fix: GpsFix) -> bool {
        match self.gps.on_fix(fix) {
            Ok(Some(vertex)) => {
                let appended = self.dispatch(SketchEvent::AppendTrackPoint(vertex), false);
                if !appended {
                    self.gps.retract(&vertex);
                }
                appended
            }
            Ok(None) => false,
            Err(SketchError::StaleAsyncFix) => {
                log::trace!("🛰️ Fix outside a running track dropped");
                false
            }
            Err(e) => {
                log::warn!("⚠️ {}", e);
                false
            }
        }
    }

    fn track_command(&mut self, command: fn(&mut GpsTrackRecorder) -> Result<(), SketchError>) -> bool {
        match command(&mut self.gps) {
            Ok(()) => {
                self.notify();
                true
            }
            Err(e) => {
                log::warn!("⚠️ {}", e);
                false
            }
        }
    }

    // ---- Undo / redo ----

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo(self.session.snapshot()) else {
            return false;
        };
        self.session.restore(snapshot);
        self.handles.release();
        self.refresh();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo(self.session.snapshot()) else {
            return false;
        };
        self.session.restore(snapshot);
        self.handles.release();
        self.refresh();
        true
    }

    // ---- Status ----

    pub fn status(&self) -> SessionStatus {
        let phase = self.session.phase();
        let sketch = self.session.sketch();
        SessionStatus {
            mode: self.session.mode(),
            phase,
            is_drawing: matches!(phase, SketchPhase::Sketching | SketchPhase::SketchingHole),
            has_geometry: matches!(phase, SketchPhase::Finalized | SketchPhase::SketchingHole)
                || !self.session.store().is_empty(),
            is_drawing_hole: phase == SketchPhase::SketchingHole,
            hole_count: sketch.map_or(0, |s| s.holes.len()),
            vertex_count: sketch.map_or(0, |s| s.outer.len()),
            multi_position: self.session.multi_position(),
            has_unsaved_changes: self.has_unsaved_changes(),
            is_editing: self.edit.is_some(),
            track: self.gps.status(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Register a listener called with the new status whenever it changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionStatus) + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ---- Internals ----

    /// Apply an event, recording an undo step when `record` is set and the
    /// event changed anything.
    fn dispatch(&mut self, event: SketchEvent, record: bool) -> bool {
        let before = record.then(|| self.session.snapshot());
        match self.session.handle(event) {
            Ok(()) => {
                if let Some(before) = before {
                    if before != self.session.snapshot() {
                        self.history.push(before);
                    }
                }
                self.refresh();
                true
            }
            Err(e @ SketchError::InvalidState(_)) => {
                log::debug!("Ignored: {}", e);
                false
            }
            Err(e) => {
                log::warn!("⚠️ {}", e);
                false
            }
        }
    }

    /// Reset everything that lives beside the session.
    fn reset_aux(&mut self) {
        self.handles.clear(&mut self.port);
        self.gps.reset();
        self.edit = None;
        self.history.clear();
        self.drag_snapshot = None;
        self.swallow_click = false;
    }

    /// Redraw the ring visuals, rebuild the handles and notify listeners.
    fn refresh(&mut self) {
        self.port.clear_visuals();
        let sketch = self.session.sketch();
        if let Some(sketch) = sketch {
            let closed = sketch.mode.is_closed();
            for (id, ring) in sketch.rings() {
                self.port
                    .update_ring_visual(VisualRole::Active(id), ring, closed);
            }
            let store = self.session.store();
            for (i, part) in store.parts().iter().enumerate() {
                if store.active_index() != Some(i) {
                    self.port
                        .update_ring_visual(VisualRole::Committed(i), &part.outer, closed);
                }
            }
        }
        self.port
            .update_ring_visual(VisualRole::HoleDraft, self.session.hole_draft(), false);

        let editable = sketch.filter(|_| self.session.phase() == SketchPhase::Finalized);
        self.handles.rebuild(editable, &mut self.port);
        self.notify();
    }

    fn notify(&mut self) {
        let status = self.status();
        self.listeners.notify(status);
    }
}
