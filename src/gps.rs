//! GPS track recording.
//!
//! The recorder turns a live position stream into sketch vertices. Each fix
//! is handled on its own as it arrives; nothing is buffered or reordered.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::error::SketchError;
use crate::geometry::{self, Geometry};
use crate::model::{CommittedPart, DrawMode, Vertex};

/// One position report from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// Position in map coordinates
    pub position: Vertex,
    /// Reported accuracy radius in meters, if known
    pub accuracy: Option<f64>,
    /// When the fix was delivered
    pub received_at: Instant,
}

impl GpsFix {
    /// Create a fix received now.
    pub fn new(position: Vertex) -> Self {
        Self {
            position,
            accuracy: None,
            received_at: Instant::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Time since the fix was delivered.
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// Recorder lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    #[default]
    Stopped,
    Recording,
    Paused,
}

/// Records GPS fixes into a line or polygon track.
#[derive(Debug, Clone)]
pub struct GpsTrackRecorder {
    status: TrackStatus,
    kind: Option<DrawMode>,
    points: Vec<Vertex>,
    last_fix: Option<GpsFix>,
    /// Movement below this (map units) does not produce a new point
    min_distance: f64,
    /// Fixes older than this do not count as current
    max_fix_age: Duration,
}

impl GpsTrackRecorder {
    pub fn new(min_distance: f64, max_fix_age: Duration) -> Self {
        Self {
            status: TrackStatus::Stopped,
            kind: None,
            points: Vec::new(),
            last_fix: None,
            min_distance,
            max_fix_age,
        }
    }

    pub fn status(&self) -> TrackStatus {
        self.status
    }

    /// Geometry kind being recorded.
    pub fn kind(&self) -> Option<DrawMode> {
        self.kind
    }

    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    /// Whether the track is recording or paused.
    pub fn is_active(&self) -> bool {
        self.status != TrackStatus::Stopped
    }

    /// The most recent fix if it is still fresh.
    pub fn current_fix(&self) -> Option<&GpsFix> {
        self.last_fix
            .as_ref()
            .filter(|fix| fix.age() <= self.max_fix_age)
    }

    /// Start recording a `kind` track seeded with the current fix.
    ///
    /// Returns the seed vertex.
    pub fn start(&mut self, kind: DrawMode) -> Result<Vertex, SketchError> {
        if !kind.supports_track() {
            return Err(SketchError::IncompatibleTrackStart {
                reason: "point mode cannot record a track",
            });
        }
        if self.is_active() {
            return Err(SketchError::InvalidState("track already running"));
        }
        let seed = self
            .current_fix()
            .map(|fix| fix.position)
            .ok_or(SketchError::IncompatibleTrackStart {
                reason: "no GPS fix available",
            })?;

        self.status = TrackStatus::Recording;
        self.kind = Some(kind);
        self.points = vec![seed];
        log::info!("🛰️ Started {} track at ({:.6}, {:.6})", kind.name(), seed.x, seed.y);
        Ok(seed)
    }

    /// Handle a delivered fix.
    ///
    /// Returns the vertex to append to the live sketch, or `None` when
    /// paused or when the device has not moved. Fixes arriving after the
    /// track stopped are refused with [`SketchError::StaleAsyncFix`] but still
    /// update the current position.
    pub fn on_fix(&mut self, fix: GpsFix) -> Result<Option<Vertex>, SketchError> {
        self.last_fix = Some(fix);
        match self.status {
            TrackStatus::Stopped => Err(SketchError::StaleAsyncFix),
            TrackStatus::Paused => Ok(None),
            TrackStatus::Recording => {
                let moved = self
                    .points
                    .last()
                    .is_none_or(|last| last.distance_to(&fix.position) > self.min_distance);
                if !moved {
                    log::trace!("🛰️ Fix within {} of last point, skipped", self.min_distance);
                    return Ok(None);
                }
                self.points.push(fix.position);
                log::trace!("🛰️ Track point {} recorded", self.points.len());
                Ok(Some(fix.position))
            }
        }
    }

    /// Drop `vertex` again if it is the last recorded point.
    ///
    /// Used when the live sketch refused the point, so the track never holds
    /// points the sketch does not.
    pub fn retract(&mut self, vertex: &Vertex) -> bool {
        if self.points.last() != Some(vertex) {
            return false;
        }
        self.points.pop();
        log::trace!("🛰️ Track point retracted, {} left", self.points.len());
        true
    }

    pub fn pause(&mut self) -> Result<(), SketchError> {
        if self.status != TrackStatus::Recording {
            return Err(SketchError::InvalidState("track is not recording"));
        }
        self.status = TrackStatus::Paused;
        log::debug!("⏸️ Track paused at {} points", self.points.len());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SketchError> {
        if self.status != TrackStatus::Paused {
            return Err(SketchError::InvalidState("track is not paused"));
        }
        self.status = TrackStatus::Recording;
        log::debug!("▶️ Track resumed");
        Ok(())
    }

    /// Stop recording and assemble the track.
    ///
    /// `Ok(None)` means the track had too few points for its geometry type
    /// and was discarded.
    pub fn stop(&mut self, precision: u32) -> Result<Option<Geometry>, SketchError> {
        if !self.is_active() {
            return Err(SketchError::InvalidState("track is not running"));
        }
        let points = std::mem::take(&mut self.points);
        let kind = self.kind.take().unwrap_or(DrawMode::Line);
        self.status = TrackStatus::Stopped;

        let geometry = geometry::assemble(kind, &[CommittedPart::new(points.clone())], precision);
        match &geometry {
            Some(_) => log::info!("🏁 {} track stopped with {} points", kind.name(), points.len()),
            None => log::warn!(
                "🏁 {} track discarded: {} points, need {}",
                kind.name(),
                points.len(),
                kind.min_vertices()
            ),
        }
        Ok(geometry)
    }

    /// Abandon any running track.
    pub fn reset(&mut self) {
        self.status = TrackStatus::Stopped;
        self.kind = None;
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder_with_fix(x: f64, y: f64) -> GpsTrackRecorder {
        let mut recorder = GpsTrackRecorder::new(1e-7, Duration::from_secs(30));
        let _ = recorder.on_fix(GpsFix::new(Vertex::new(x, y)));
        recorder
    }

    #[test]
    fn test_start_requires_fix() {
        let mut recorder = GpsTrackRecorder::new(1e-7, Duration::from_secs(30));
        let err = recorder.start(DrawMode::Line).unwrap_err();
        assert!(matches!(err, SketchError::IncompatibleTrackStart { .. }));
        assert_eq!(recorder.status(), TrackStatus::Stopped);
    }

    #[test]
    fn test_start_refuses_point_mode() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        assert!(recorder.start(DrawMode::Point).is_err());
        assert!(!recorder.is_active());
    }

    #[test]
    fn test_records_moving_fixes_only() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        assert_eq!(recorder.start(DrawMode::Line), Ok(Vertex::new(0.0, 0.0)));
        assert_eq!(recorder.on_fix(GpsFix::new(Vertex::new(0.0, 0.0))), Ok(None));
        assert_eq!(
            recorder.on_fix(GpsFix::new(Vertex::new(1.0, 0.0))),
            Ok(Some(Vertex::new(1.0, 0.0)))
        );
        assert_eq!(recorder.points().len(), 2);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        recorder.start(DrawMode::Line).unwrap();
        recorder.pause().unwrap();
        assert_eq!(recorder.on_fix(GpsFix::new(Vertex::new(1.0, 0.0))), Ok(None));
        recorder.resume().unwrap();
        assert!(recorder.on_fix(GpsFix::new(Vertex::new(2.0, 0.0))).unwrap().is_some());
        assert_eq!(recorder.points().len(), 2);
        assert!(recorder.resume().is_err());
    }

    #[test]
    fn test_fix_after_stop_is_stale() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        recorder.start(DrawMode::Line).unwrap();
        recorder.stop(7).unwrap();
        assert_eq!(
            recorder.on_fix(GpsFix::new(Vertex::new(5.0, 5.0))),
            Err(SketchError::StaleAsyncFix)
        );
        assert!(recorder.points().is_empty());
    }

    #[test]
    fn test_retract_only_last_point() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        recorder.start(DrawMode::Line).unwrap();
        recorder.on_fix(GpsFix::new(Vertex::new(1.0, 0.0))).unwrap();
        assert!(!recorder.retract(&Vertex::new(0.0, 0.0)));
        assert!(recorder.retract(&Vertex::new(1.0, 0.0)));
        assert_eq!(recorder.points(), &[Vertex::new(0.0, 0.0)]);

        // The next fix is measured against the remaining last point
        assert_eq!(
            recorder.on_fix(GpsFix::new(Vertex::new(1.0, 0.0))),
            Ok(Some(Vertex::new(1.0, 0.0)))
        );
    }

    #[test]
    fn test_stop_polygon_minimum() {
        let mut recorder = recorder_with_fix(0.0, 0.0);
        recorder.start(DrawMode::Polygon).unwrap();
        recorder.on_fix(GpsFix::new(Vertex::new(1.0, 0.0))).unwrap();
        assert_eq!(recorder.stop(7), Ok(None));

        // Seeded from the last fix at (1, 0)
        recorder.start(DrawMode::Polygon).unwrap();
        recorder.on_fix(GpsFix::new(Vertex::new(2.0, 0.0))).unwrap();
        recorder.on_fix(GpsFix::new(Vertex::new(2.0, 1.0))).unwrap();
        let Some(Geometry::Polygon { coordinates }) = recorder.stop(7).unwrap() else {
            panic!("Expected Polygon");
        };
        assert_eq!(coordinates[0].len(), 4);
        assert_eq!(coordinates[0].first(), coordinates[0].last());
    }
}
