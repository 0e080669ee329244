//! Scripted sessions.
//!
//! A script is a JSON document naming the target layer and a list of steps
//! (UI commands, pointer gestures and GPS fixes). Replaying it drives a
//! [`SketchFacade`] on a [`SceneSurface`] and collects what the session
//! produced.

use serde::{Deserialize, Serialize};

use crate::config::SketchConfig;
use crate::error::GeometryError;
use crate::facade::{PointerEvent, PointerKind, SketchFacade, SketchOutput};
use crate::geometry::Geometry;
use crate::gps::GpsFix;
use crate::model::{DrawMode, Feature, LayerDescriptor, Vertex};
use crate::render::SceneSurface;
use crate::sketch::NavDirection;
use crate::viewport::Viewport;

/// Pixel size of the exported SVG.
pub const SVG_WIDTH: u32 = 800;
pub const SVG_HEIGHT: u32 = 600;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Start { mode: DrawMode },
    Cancel,
    Finish,
    /// Plain map click
    Click { at: Vertex },
    DoubleClick { at: Vertex },
    /// Press, move and release
    Drag { from: Vertex, to: Vertex },
    /// Secondary click on a vertex handle
    Delete { at: Vertex },
    /// Raw pointer event
    Pointer { event: PointerEvent },
    SetViewport { viewport: Viewport },
    RemoveLastVertex,
    StartHole,
    FinishHole,
    CancelHole,
    RemoveLastHole,
    Edit { feature: Feature },
    Navigate { direction: NavDirection },
    Apply { geometry: Geometry },
    Seed { geometry: Geometry },
    GpsFix {
        at: Vertex,
        #[serde(default)]
        accuracy: Option<f64>,
    },
    StartTrack { kind: DrawMode },
    PauseTrack,
    ResumeTrack,
    StopTrack,
    Undo,
    Redo,
}

/// A replayable session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub layer: LayerDescriptor,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    pub steps: Vec<Step>,
}

fn default_viewport() -> Viewport {
    Viewport::new(100.0, 0.0, SVG_HEIGHT as f64)
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a replay produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayOutcome {
    /// Geometries returned by `finish` steps
    pub finished: Vec<SketchOutput>,
    /// Geometries returned by `stop_track` steps
    pub tracks: Vec<Geometry>,
    /// Steps that were refused or produced nothing
    pub refused: Vec<usize>,
    /// Scene as SVG, taken before the last finish (or at the end)
    #[serde(skip)]
    pub svg: String,
}

/// Run `script` from a fresh session.
pub fn replay(script: &Script, config: SketchConfig) -> ReplayOutcome {
    let scene = SceneSurface::new(script.viewport);
    let mut facade = SketchFacade::new(scene, script.layer.clone(), config);
    let mut outcome = ReplayOutcome::default();
    let mut svg = None;

    log::info!("🎬 Replaying {} steps on layer '{}'", script.steps.len(), script.layer.name);
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("🎬 Step {}: {:?}", index, step);
        if *step == Step::Finish {
            svg = Some(facade.port().to_svg(SVG_WIDTH, SVG_HEIGHT));
        }
        if !run_step(&mut facade, step, &script.layer, &mut outcome) {
            outcome.refused.push(index);
        }
    }

    outcome.svg = svg.unwrap_or_else(|| facade.port().to_svg(SVG_WIDTH, SVG_HEIGHT));
    if !outcome.refused.is_empty() {
        log::warn!("⚠️ {} step(s) refused: {:?}", outcome.refused.len(), outcome.refused);
    }
    outcome
}

fn run_step(
    facade: &mut SketchFacade<SceneSurface>,
    step: &Step,
    layer: &LayerDescriptor,
    outcome: &mut ReplayOutcome,
) -> bool {
    let pointer = |kind, at| PointerEvent::new(kind, at);
    match step {
        Step::Start { mode } => facade.start(*mode),
        Step::Cancel => {
            facade.cancel();
            true
        }
        Step::Finish => match facade.finish() {
            Some(output) => {
                outcome.finished.push(output);
                true
            }
            None => false,
        },
        Step::Click { at } => facade.pointer(pointer(PointerKind::Click, *at)),
        Step::DoubleClick { at } => {
            facade.pointer(pointer(PointerKind::DoubleClick, *at))
        }
        Step::Drag { from, to } => {
            facade.pointer(pointer(PointerKind::Down, *from));
            facade.pointer(pointer(PointerKind::Move, *to));
            facade.pointer(pointer(PointerKind::Up, *to))
        }
        Step::Delete { at } => facade.pointer(pointer(PointerKind::SecondaryClick, *at)),
        Step::Pointer { event } => facade.pointer(*event),
        Step::SetViewport { viewport } => {
            facade.port_mut().set_viewport(*viewport);
            true
        }
        Step::RemoveLastVertex => facade.remove_last_vertex(),
        Step::StartHole => facade.start_hole(),
        Step::FinishHole => facade.finish_hole(),
        Step::CancelHole => facade.cancel_hole(),
        Step::RemoveLastHole => facade.remove_last_hole(),
        Step::Edit { feature } => facade.start_editing_existing(feature, layer),
        Step::Navigate { direction } => facade.navigate_multi_geometry(*direction),
        Step::Apply { geometry } => facade.apply_external_geometry(geometry),
        Step::Seed { geometry } => {
            facade.set_pending_seed(geometry.clone());
            true
        }
        Step::GpsFix { at, accuracy } => {
            let fix = GpsFix::new(*at);
            let fix = match accuracy {
                Some(accuracy) => fix.with_accuracy(*accuracy),
                None => fix,
            };
            // Fixes outside a track only move the current position
            facade.on_gps_fix(fix);
            true
        }
        Step::StartTrack { kind } => facade.start_track(*kind),
        Step::PauseTrack => facade.pause_track(),
        Step::ResumeTrack => facade.resume_track(),
        Step::StopTrack => match facade.stop_track() {
            Some(track) => {
                outcome.tracks.push(track);
                true
            }
            None => false,
        },
        Step::Undo => facade.undo(),
        Step::Redo => facade.redo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_polygon_with_hole() {
        let json = r#"{
            "layer": { "name": "parcels", "geometry_type": "gml:MultiSurfacePropertyType" },
            "viewport": { "zoom": 100.0, "pan_x": 0.0, "pan_y": 600.0 },
            "steps": [
                { "action": "start", "mode": "polygon" },
                { "action": "click", "at": [0, 0] },
                { "action": "click", "at": [4, 0] },
                { "action": "click", "at": [4, 4] },
                { "action": "double_click", "at": [4, 4] },
                { "action": "start_hole" },
                { "action": "click", "at": [1, 1] },
                { "action": "click", "at": [2, 1] },
                { "action": "click", "at": [2, 2] },
                { "action": "finish_hole" },
                { "action": "finish" }
            ]
        }"#;
        let script = Script::from_json(json).unwrap();
        let outcome = replay(&script, SketchConfig::default());

        assert!(outcome.refused.is_empty());
        assert_eq!(outcome.finished.len(), 1);
        let Geometry::Polygon { coordinates } = &outcome.finished[0].geometry else {
            panic!("Expected Polygon");
        };
        assert_eq!(coordinates.len(), 2);
        assert!(outcome.svg.contains("<polygon"));
    }

    #[test]
    fn test_replay_gps_line() {
        let json = r#"{
            "layer": { "name": "tracks", "geometry_type": "LineString" },
            "steps": [
                { "action": "gps_fix", "at": [10.0, 50.0], "accuracy": 4.5 },
                { "action": "start_track", "kind": "line" },
                { "action": "gps_fix", "at": [10.001, 50.0] },
                { "action": "gps_fix", "at": [10.002, 50.001] },
                { "action": "stop_track" },
                { "action": "finish" }
            ]
        }"#;
        let script = Script::from_json(json).unwrap();
        let outcome = replay(&script, SketchConfig::default());
        assert!(outcome.refused.is_empty());
        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.tracks[0], outcome.finished[0].geometry);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let json = r#"{ "layer": { "name": "x", "geometry_type": "Point" }, "steps": [ { "action": "fly" } ] }"#;
        assert!(Script::from_json(json).is_err());
    }
}
