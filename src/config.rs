//! Configuration file support.
//!
//! Tuning values for the sketch engine (thresholds, precision, GPS filtering,
//! history depth and logging) are read from a versioned JSON file. Every
//! field has a default, so partial files are accepted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Sketch engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Screen distance (px) from the last vertex that counts as a close click
    #[serde(default = "default_close_threshold")]
    pub close_threshold_px: f64,

    /// Screen radius (px) within which a press grabs a handle
    #[serde(default = "default_handle_hit_radius")]
    pub handle_hit_radius_px: f64,

    /// Decimal places used when comparing coordinates (change detection and
    /// ring closing); output coordinates are not rounded
    #[serde(default = "default_precision")]
    pub coordinate_precision: u32,

    /// Minimum movement (map units) between recorded GPS points
    #[serde(default = "default_gps_min_distance")]
    pub gps_min_distance: f64,

    /// Fixes older than this many seconds cannot seed a track
    #[serde(default = "default_gps_max_fix_age")]
    pub gps_max_fix_age_secs: u64,

    /// Undo steps to keep
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_close_threshold() -> f64 {
    constants::CLOSE_THRESHOLD_PX
}

fn default_handle_hit_radius() -> f64 {
    constants::HANDLE_HIT_RADIUS_PX
}

fn default_precision() -> u32 {
    constants::COORDINATE_PRECISION
}

fn default_gps_min_distance() -> f64 {
    constants::GPS_MIN_DISTANCE
}

fn default_gps_max_fix_age() -> u64 {
    constants::GPS_MAX_FIX_AGE_SECS
}

fn default_max_history() -> usize {
    constants::DEFAULT_MAX_HISTORY
}

impl SketchConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            close_threshold_px: default_close_threshold(),
            handle_hit_radius_px: default_handle_hit_radius(),
            coordinate_precision: default_precision(),
            gps_min_distance: default_gps_min_distance(),
            gps_max_fix_age_secs: default_gps_max_fix_age(),
            max_history: default_max_history(),
            log_level: LogLevel::default(),
        }
    }

    pub fn gps_max_fix_age(&self) -> Duration {
        Duration::from_secs(self.gps_max_fix_age_secs)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        if !(config.close_threshold_px >= 0.0 && config.handle_hit_radius_px >= 0.0) {
            return Err(ConfigError::Invalid("pixel thresholds must be non-negative"));
        }

        Ok(config)
    }

    /// Read configuration from a JSON file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "geosketch.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("geosketch").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("geosketch")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
