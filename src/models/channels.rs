//! Sensor channel data: raw counts, sensitivity divisors and normalized ratios.

use serde::{Deserialize, Serialize};

/// One instantaneous 4-channel sensor sample.
///
/// `c` is the unfiltered "clear" channel used for normalization. A sample with
/// `c == 0` (no light reached the sensor) is valid but degenerate; see
/// [`RawChannels::is_dark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawChannels {
    /// Red channel count
    pub r: u16,
    /// Green channel count
    pub g: u16,
    /// Blue channel count
    pub b: u16,
    /// Clear (unfiltered) channel count
    pub c: u16,
}

impl RawChannels {
    /// Creates a sample from individual channel counts.
    #[must_use]
    pub const fn new(r: u16, g: u16, b: u16, c: u16) -> Self {
        Self { r, g, b, c }
    }

    /// Returns true when the clear channel is zero.
    #[must_use]
    pub const fn is_dark(&self) -> bool {
        self.c == 0
    }
}

/// Fixed per-channel correction divisors for a sensor model.
///
/// Each raw channel is divided by its divisor before normalization, which
/// compensates for the photodiode's uneven spectral response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityProfile {
    /// Red divisor
    pub red: f64,
    /// Green divisor
    pub green: f64,
    /// Blue divisor
    pub blue: f64,
}

impl SensitivityProfile {
    /// BH1745 relative sensitivity: red peaks near 615nm at ~0.7, green near
    /// 540nm at ~1.0, blue near 465nm at ~0.55.
    pub const BH1745: Self = Self {
        red: 0.7,
        green: 1.0,
        blue: 0.55,
    };
}

impl Default for SensitivityProfile {
    fn default() -> Self {
        Self::BH1745
    }
}

/// Raw channels divided by the clear channel.
///
/// Values are not clamped and may exceed 1.0 under bright or mixed light.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedColor {
    /// Red ratio
    pub r: f64,
    /// Green ratio
    pub g: f64,
    /// Blue ratio
    pub b: f64,
}

impl NormalizedColor {
    /// The zero-luminance sentinel returned for dark samples.
    pub const ZERO: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Creates a normalized color from channel ratios.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}
