//! Error types for sketch operations.
//!
//! Every variant of [`SketchError`] is a local, non-fatal refusal. The facade
//! turns them into boolean or `Option` results and logs them; callers are
//! expected to check the observable status before issuing a command.

use thiserror::Error;

use crate::model::DrawMode;

/// Refusals raised by the session reducer, the handle controller, the
/// multi-geometry store and the GPS recorder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SketchError {
    /// The ring would fall below the minimum vertex count of its geometry type.
    #[error("{mode:?} ring needs at least {required} vertices, has {actual}")]
    InsufficientVertices {
        /// Draw mode of the ring
        mode: DrawMode,
        /// Minimum vertex count for the mode
        required: usize,
        /// Vertex count the operation would produce or found
        actual: usize,
    },

    /// An external geometry could not be mapped onto the active draw mode.
    #[error("Cannot derive a {mode:?} sketch from a {geometry_type} geometry")]
    UnsupportedSeedGeometry {
        /// The draw mode that was requested
        mode: DrawMode,
        /// GeoJSON type name of the offered geometry
        geometry_type: &'static str,
    },

    /// GPS track recording cannot start in the current situation.
    #[error("Cannot start GPS track: {reason}")]
    IncompatibleTrackStart {
        /// Why the start was refused
        reason: &'static str,
    },

    /// A GPS fix arrived while the recorder was not recording.
    #[error("GPS fix arrived after the track was stopped")]
    StaleAsyncFix,

    /// The command is not valid in the current phase.
    #[error("Invalid in current state: {0}")]
    InvalidState(&'static str),
}

impl SketchError {
    /// Create an insufficient vertices error for a mode and a vertex count.
    pub fn insufficient(mode: DrawMode, actual: usize) -> Self {
        Self::InsufficientVertices {
            mode,
            required: mode.min_vertices(),
            actual,
        }
    }
}

/// Errors that can occur when parsing GeoJSON.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
