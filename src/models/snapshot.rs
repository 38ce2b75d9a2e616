//! The immutable result of one sampling cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{NormalizedColor, RawChannels, ScaledColor};
use crate::constants::UNKNOWN_COLOR_NAME;

/// One fully computed reading, handed to every sink.
///
/// A snapshot is built once per cycle and never changed after it has been
/// published. Fields are private so a published snapshot cannot be edited;
/// [`MeasurementSnapshot::with_color_name`] consumes the value and is only
/// usable before the snapshot is shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSnapshot {
    timestamp: DateTime<Utc>,
    raw: RawChannels,
    normalized: NormalizedColor,
    scaled: ScaledColor,
    color_name: Option<String>,
    lrv: f64,
}

impl MeasurementSnapshot {
    /// Bundles already-computed fields into a snapshot.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        raw: RawChannels,
        normalized: NormalizedColor,
        scaled: ScaledColor,
        color_name: Option<String>,
        lrv: f64,
    ) -> Self {
        Self {
            timestamp,
            raw,
            normalized,
            scaled,
            color_name,
            lrv,
        }
    }

    /// Replaces the color name, consuming the snapshot.
    #[must_use]
    pub fn with_color_name(self, color_name: Option<String>) -> Self {
        Self { color_name, ..self }
    }

    /// Capture time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Raw sensor sample.
    #[must_use]
    pub const fn raw(&self) -> &RawChannels {
        &self.raw
    }

    /// Normalized channel ratios.
    #[must_use]
    pub const fn normalized(&self) -> &NormalizedColor {
        &self.normalized
    }

    /// 8-bit scaled reading.
    #[must_use]
    pub const fn scaled(&self) -> &ScaledColor {
        &self.scaled
    }

    /// Color name, if one was determined.
    #[must_use]
    pub fn color_name(&self) -> Option<&str> {
        self.color_name.as_deref()
    }

    /// Color name, or "Unknown".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.color_name().unwrap_or(UNKNOWN_COLOR_NAME)
    }

    /// Light Reflectance Value, 0-100.
    #[must_use]
    pub const fn lrv(&self) -> f64 {
        self.lrv
    }

    /// Lowercase `#rrggbb` of the scaled reading.
    #[must_use]
    pub fn color_hex(&self) -> String {
        self.scaled.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MeasurementSnapshot {
        MeasurementSnapshot::new(
            Utc::now(),
            RawChannels::new(1, 2, 3, 4),
            NormalizedColor::new(0.25, 0.5, 0.75),
            ScaledColor::new(63, 127, 191),
            None,
            42.0,
        )
    }

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let snapshot = sample();
        assert_eq!(snapshot.color_name(), None);
        assert_eq!(snapshot.display_name(), "Unknown");
    }

    #[test]
    fn test_with_color_name_keeps_other_fields() {
        let snapshot = sample();
        let named = snapshot.clone().with_color_name(Some("SteelBlue".to_string()));
        assert_eq!(named.display_name(), "SteelBlue");
        assert_eq!(named.timestamp(), snapshot.timestamp());
        assert_eq!(named.raw(), snapshot.raw());
        assert!((named.lrv() - 42.0).abs() < f64::EPSILON);
        assert_eq!(named.color_hex(), "#3f7fbf");
    }
}
