//! Global constants for the sketching engine

/// Screen-space distance (pixels) within which a click on the last vertex ends the sketch.
pub const CLOSE_THRESHOLD_PX: f64 = 3.0;

/// Screen-space radius (pixels) for hitting a vertex or midpoint handle.
pub const HANDLE_HIT_RADIUS_PX: f64 = 8.0;

/// Decimal places kept when rounding coordinates for comparison.
pub const COORDINATE_PRECISION: u32 = 7;

/// Minimum map-space movement before a GPS fix is recorded as a new track point.
pub const GPS_MIN_DISTANCE: f64 = 1e-7;

/// A GPS fix older than this (seconds) no longer counts as a current fix.
pub const GPS_MAX_FIX_AGE_SECS: u64 = 30;

/// Default number of undo snapshots kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 100;
