//! Data models for sensor readings, palettes and measurement results.
//!
//! This module contains the plain data structures used throughout the application.
//! Models are independent of sensor hardware, sinks and the status page.

pub mod calibration;
pub mod channels;
pub mod color_palette;
pub mod rgb;
pub mod snapshot;

// Re-export all model types
pub use calibration::{CalibrationSample, CalibrationState};
pub use channels::{NormalizedColor, RawChannels, SensitivityProfile};
pub use color_palette::{ColorPalette, PaletteEntry};
pub use rgb::{RgbColor, ScaledColor};
pub use snapshot::MeasurementSnapshot;
