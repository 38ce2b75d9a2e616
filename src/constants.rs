//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the fixed numeric parameters of the
//! measurement pipeline.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "LRV Meter";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "lrv-meter";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "LrvMeter";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "LRV_METER_CONFIG_DIR";

/// CIE relative luminance weight for the red channel.
pub const LUMA_RED: f64 = 0.2126;

/// CIE relative luminance weight for the green channel.
pub const LUMA_GREEN: f64 = 0.7152;

/// CIE relative luminance weight for the blue channel.
pub const LUMA_BLUE: f64 = 0.0722;

/// Upper bound of the LRV scale.
pub const LRV_CEILING: f64 = 100.0;

/// Scaling factor used when no calibration could be derived.
pub const DEFAULT_SCALING_FACTOR: f64 = 100.0;

/// Raw readings taken per calibration reference.
pub const READINGS_PER_SAMPLE: usize = 5;

/// Characters of the color name that fit on one display line.
pub const DISPLAY_NAME_WIDTH: usize = 16;

/// Name reported when no color name is available.
pub const UNKNOWN_COLOR_NAME: &str = "Unknown";
