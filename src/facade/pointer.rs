//! Pointer protocol: turns raw map pointer events into sketch commands.

use serde::{Deserialize, Serialize};

use super::SketchFacade;
use crate::model::Vertex;
use crate::render::RenderPort;
use crate::sketch::{SketchEvent, SketchPhase};

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Click,
    DoubleClick,
    /// Right click or long press
    SecondaryClick,
}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// A pointer event in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub at: Vertex,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, at: Vertex) -> Self {
        Self {
            kind,
            at,
            modifiers: Modifiers::none(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl<P: RenderPort> SketchFacade<P> {
    /// Feed one pointer event. Returns whether it changed the sketch.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        match event.kind {
            PointerKind::Down => self.press(event),
            PointerKind::Move => {
                let Some(drag) = self.handles.drag_to(event.at) else {
                    return false;
                };
                let moved = self.dispatch(drag, false);
                if moved {
                    // Maps fire no click after a real drag
                    self.swallow_click = false;
                }
                moved
            }
            PointerKind::Up => self.release(),
            PointerKind::Click => {
                // The click that ends a handle press without movement
                if std::mem::take(&mut self.swallow_click) {
                    log::trace!("Click after handle press swallowed");
                    return false;
                }
                if event.modifiers.any() {
                    return self.delete_at(event.at);
                }
                let viewport = self.port.viewport();
                self.dispatch(
                    SketchEvent::Click {
                        at: event.at,
                        viewport,
                    },
                    true,
                )
            }
            PointerKind::DoubleClick => {
                self.swallow_click = false;
                self.dispatch(SketchEvent::DoubleClick, true)
            }
            PointerKind::SecondaryClick => self.delete_at(event.at),
        }
    }

    fn press(&mut self, event: PointerEvent) -> bool {
        if self.session.phase() != SketchPhase::Finalized || event.modifiers.any() {
            return false;
        }
        let viewport = self.port.viewport();
        let Some(handle) =
            self.handles
                .hit_test(&event.at, &viewport, self.config.handle_hit_radius_px)
        else {
            return false;
        };

        self.drag_snapshot = Some(self.session.snapshot());
        self.swallow_click = true;
        let Some(insert) = self.handles.press(&handle) else {
            return false;
        };
        if !self.dispatch(insert, false) {
            self.handles.release();
            self.drag_snapshot = None;
            self.swallow_click = false;
            return false;
        }
        true
    }

    fn release(&mut self) -> bool {
        if !self.handles.release() {
            return false;
        }
        let Some(before) = self.drag_snapshot.take() else {
            return false;
        };
        let changed = before != self.session.snapshot();
        if changed {
            self.history.push(before);
        }
        self.refresh();
        changed
    }

    fn delete_at(&mut self, at: Vertex) -> bool {
        if self.session.phase() != SketchPhase::Finalized {
            return false;
        }
        let viewport = self.port.viewport();
        let delete = self
            .handles
            .hit_test(&at, &viewport, self.config.handle_hit_radius_px)
            .and_then(|handle| self.handles.delete(&handle));
        match delete {
            Some(event) => self.dispatch(event, true),
            None => false,
        }
    }
}
