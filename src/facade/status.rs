//! Observable session status and change listeners.

use serde::Serialize;

use crate::gps::TrackStatus;
use crate::model::DrawMode;
use crate::sketch::SketchPhase;

/// Everything the surrounding UI needs to enable or disable its controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionStatus {
    /// Draw mode of the current sketch
    pub mode: Option<DrawMode>,
    pub phase: SketchPhase,
    /// Vertices of the outer ring or a hole are being placed
    pub is_drawing: bool,
    /// A finalized geometry (or committed part) exists
    pub has_geometry: bool,
    pub is_drawing_hole: bool,
    pub hole_count: usize,
    /// Vertices in the active outer ring
    pub vertex_count: usize,
    /// Zero-based active part and part total of a multi-geometry
    pub multi_position: Option<(usize, usize)>,
    pub has_unsaved_changes: bool,
    /// An existing feature is being edited
    pub is_editing: bool,
    pub track: TrackStatus,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Handle returned by [`super::SketchFacade::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(super) u64);

type Listener = Box<dyn FnMut(&SessionStatus)>;

/// Registered listeners plus the last status they were told about.
#[derive(Default)]
pub(super) struct Listeners {
    entries: Vec<(ListenerId, Listener)>,
    next_id: u64,
    last: Option<SessionStatus>,
}

impl Listeners {
    pub(super) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        log::debug!("👂 Listener {} subscribed", id.0);
        id
    }

    pub(super) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    /// Call every listener if `status` differs from the last one sent.
    pub(super) fn notify(&mut self, status: SessionStatus) {
        if self.last.as_ref() == Some(&status) {
            return;
        }
        for (_, listener) in self.entries.iter_mut() {
            listener(&status);
        }
        self.last = Some(status);
    }
}
