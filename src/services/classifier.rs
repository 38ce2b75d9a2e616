//! Nearest-color classification over a fixed palette.

use crate::models::{ColorPalette, PaletteEntry, ScaledColor};

/// Result of classifying one color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification<'a> {
    /// The closest palette entry.
    pub entry: &'a PaletteEntry,
    /// Euclidean RGB distance to that entry.
    pub distance: f64,
}

impl Classification<'_> {
    /// Name of the matched entry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

/// Finds the palette entry closest to `rgb` in RGB space.
///
/// Ties go to the entry that comes first in palette order: only a strictly
/// smaller distance replaces the current best. With duplicate codes, the
/// earlier name is always reported.
#[must_use]
pub fn nearest<'a>(rgb: &ScaledColor, palette: &'a ColorPalette) -> Classification<'a> {
    // ColorPalette is non-empty by construction.
    let entries = palette.entries();
    let mut best = &entries[0];
    let mut best_distance = rgb.distance_squared(&best.rgb);
    for entry in &entries[1..] {
        let distance = rgb.distance_squared(&entry.rgb);
        if distance < best_distance {
            best = entry;
            best_distance = distance;
        }
    }

    Classification {
        entry: best,
        distance: f64::from(best_distance).sqrt(),
    }
}

/// Name of the palette entry closest to `rgb`.
#[must_use]
pub fn classify<'a>(rgb: &ScaledColor, palette: &'a ColorPalette) -> &'a str {
    &nearest(rgb, palette).entry.name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RgbColor;

    fn palette(entries: &[(&str, (u8, u8, u8))]) -> ColorPalette {
        ColorPalette::new(
            entries
                .iter()
                .map(|(name, (r, g, b))| PaletteEntry::new(*name, RgbColor::new(*r, *g, *b)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match_has_zero_distance() {
        let html = ColorPalette::load().unwrap();
        let result = nearest(&RgbColor::new(0xBD, 0xB7, 0x6B), &html);
        assert_eq!(result.name(), "DarkKhaki");
        assert!(result.distance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_nearest_by_euclidean_distance() {
        let p = palette(&[("Black", (0, 0, 0)), ("White", (255, 255, 255))]);
        assert_eq!(classify(&RgbColor::new(100, 100, 100), &p), "Black");
        assert_eq!(classify(&RgbColor::new(200, 180, 190), &p), "White");
    }

    #[test]
    fn test_duplicate_codes_first_entry_wins() {
        let html = ColorPalette::load().unwrap();
        // Fuchsia precedes Magenta and both are #FF00FF
        assert_eq!(classify(&RgbColor::new(255, 0, 255), &html), "Fuchsia");
        assert_eq!(classify(&RgbColor::new(250, 5, 250), &html), "Fuchsia");
    }

    #[test]
    fn test_equidistant_entries_first_wins() {
        let p = palette(&[("Low", (10, 0, 0)), ("High", (30, 0, 0))]);
        assert_eq!(classify(&RgbColor::new(20, 0, 0), &p), "Low");

        let reversed = palette(&[("High", (30, 0, 0)), ("Low", (10, 0, 0))]);
        assert_eq!(classify(&RgbColor::new(20, 0, 0), &reversed), "High");
    }

    #[test]
    fn test_single_entry_palette() {
        let p = palette(&[("Only", (1, 2, 3))]);
        let result = nearest(&RgbColor::new(255, 255, 255), &p);
        assert_eq!(result.name(), "Only");
        assert!(result.distance > 0.0);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let html = ColorPalette::load().unwrap();
        let color = RgbColor::new(85, 102, 68);
        let first = classify(&color, &html);
        for _ in 0..10 {
            assert_eq!(classify(&color, &html), first);
        }
    }
}
