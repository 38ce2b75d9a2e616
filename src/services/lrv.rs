//! Light Reflectance Value calculation.

use crate::constants::{LRV_CEILING, LUMA_BLUE, LUMA_GREEN, LUMA_RED};
use crate::models::{NormalizedColor, RawChannels};

use super::normalizer::normalize;

/// CIE relative luminance of normalized channels.
#[must_use]
pub fn luminance(color: &NormalizedColor) -> f64 {
    LUMA_RED * color.r + LUMA_GREEN * color.g + LUMA_BLUE * color.b
}

/// Unscaled luminance of a raw sample, normalized by the clear channel only.
///
/// Dark samples have zero luminance. Sensitivity correction is never applied
/// here.
#[must_use]
pub fn raw_luminance(raw: &RawChannels) -> f64 {
    luminance(&normalize(raw, None))
}

/// Computes the LRV of a raw sample: `round(min(100, Y * scaling_factor), 1)`.
///
/// Returns 0 for a dark sample. Readings brighter than the calibrated white
/// reference report 100. There is no lower clamp.
///
/// ```
/// use lrv_meter::models::RawChannels;
/// use lrv_meter::services::lrv::compute;
///
/// assert_eq!(compute(&RawChannels::new(50, 60, 40, 150), 100.0), 37.6);
/// assert_eq!(compute(&RawChannels::new(50, 60, 40, 0), 100.0), 0.0);
/// ```
#[must_use]
pub fn compute(raw: &RawChannels, scaling_factor: f64) -> f64 {
    if raw.is_dark() {
        return 0.0;
    }
    round_tenth((raw_luminance(raw) * scaling_factor).min(LRV_CEILING))
}

/// Rounds to one decimal place.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_luminance_weights() {
        assert_relative_eq!(luminance(&NormalizedColor::new(1.0, 1.0, 1.0)), 1.0);
        assert_relative_eq!(luminance(&NormalizedColor::new(1.0, 0.0, 0.0)), 0.2126);
        assert_relative_eq!(luminance(&NormalizedColor::new(0.0, 1.0, 0.0)), 0.7152);
        assert_relative_eq!(luminance(&NormalizedColor::new(0.0, 0.0, 1.0)), 0.0722);
    }

    #[test]
    fn test_compute_reference_reading() {
        let raw = RawChannels::new(50, 60, 40, 150);
        assert_relative_eq!(raw_luminance(&raw), 0.3762, epsilon = 1e-9);
        assert_relative_eq!(compute(&raw, 100.0), 37.6);
    }

    #[test]
    fn test_compute_dark_sample_is_zero_for_any_factor() {
        for factor in [0.0, 1.0, 100.0, 250.0, 1e9] {
            assert_eq!(compute(&RawChannels::new(9, 9, 9, 0), factor), 0.0);
        }
    }

    #[test]
    fn test_compute_ceiling() {
        let raw = RawChannels::new(900, 900, 900, 100);
        assert_relative_eq!(compute(&raw, 100.0), 100.0);
    }

    #[test]
    fn test_compute_ignores_sensitivity_profile() {
        // Same raw values, correction would raise red/blue contributions
        let raw = RawChannels::new(70, 100, 55, 200);
        let expected = round_tenth((0.2126 * 0.35 + 0.7152 * 0.5 + 0.0722 * 0.275) * 100.0);
        assert_relative_eq!(compute(&raw, 100.0), expected);
    }

    #[test]
    fn test_compute_bounds_and_formula_over_grid() {
        for c in [1u16, 17, 150, 1024, 65535] {
            for (r, g, b) in [(0u16, 0u16, 0u16), (5, 9, 2), (400, 300, 200), (65535, 0, 65535)] {
                for factor in [1.0, 87.5, 100.0, 240.0] {
                    let raw = RawChannels::new(r, g, b, c);
                    let lrv = compute(&raw, factor);
                    let y = raw_luminance(&raw);
                    assert!((0.0..=100.0).contains(&lrv), "{raw:?} x {factor} -> {lrv}");
                    assert_relative_eq!(lrv, round_tenth((y * factor).min(100.0)));
                }
            }
        }
    }

    #[test]
    fn test_round_tenth() {
        assert_relative_eq!(round_tenth(36.24), 36.2);
        assert_relative_eq!(round_tenth(36.26), 36.3);
        assert_relative_eq!(round_tenth(0.04), 0.0);
    }
}
