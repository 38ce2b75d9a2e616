//! Calibration reference definitions and the persisted calibration result.

use serde::{Deserialize, Serialize};

/// A physical reference with a known reflectance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Label shown to the operator (e.g., "White Reference").
    pub label: String,
    /// Ground-truth reflectance of the reference, 0-100.
    pub known_reflectance_pct: f64,
}

impl CalibrationSample {
    /// Creates a reference definition.
    pub fn new(label: impl Into<String>, known_reflectance_pct: f64) -> Self {
        Self {
            label: label.into(),
            known_reflectance_pct,
        }
    }

    /// The default three-point reference set: white, mid gray and black cards.
    #[must_use]
    pub fn default_references() -> Vec<Self> {
        vec![
            Self::new("White Reference", 96.0),
            Self::new("Gray Reference", 50.0),
            Self::new("Black Reference", 4.0),
        ]
    }
}

/// The single derived calibration parameter.
///
/// Serialized as `{"scaling_factor": <float>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Multiplier converting normalized luminance into LRV percent.
    pub scaling_factor: f64,
}

impl CalibrationState {
    /// Wraps a scaling factor.
    #[must_use]
    pub const fn new(scaling_factor: f64) -> Self {
        Self { scaling_factor }
    }

    /// A usable factor is finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.scaling_factor.is_finite() && self.scaling_factor > 0.0
    }
}
