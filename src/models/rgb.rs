//! 8-bit RGB color handling with hex parsing and sensor-side scaling.

// Allow small types passed by reference for API consistency
#![allow(clippy::trivially_copy_pass_by_ref)]
// Allow intentional type casts for channel scaling
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RawChannels;

/// RGB color value with hex string representation.
///
/// Represents a color using red, green, and blue channels (0-255 each).
/// Used both for palette reference colors and for the display-ready
/// reading produced by the sensor ([`ScaledColor`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

/// Display/classification-ready 8-bit reading derived from raw channels.
pub type ScaledColor = RgbColor;

impl RgbColor {
    /// Creates a new `RgbColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses an `RgbColor` from a hex string.
    ///
    /// Supports formats: "#RRGGBB", "RRGGBB", "#rrggbb", "rrggbb"
    ///
    /// # Examples
    ///
    /// ```
    /// use lrv_meter::models::RgbColor;
    ///
    /// let color = RgbColor::from_hex("#F5F5DC").unwrap();
    /// assert_eq!(color, RgbColor::new(245, 245, 220));
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 || !hex.is_ascii() {
            anyhow::bail!("Invalid hex color format '{hex}'. Expected 6 hex digits (RRGGBB)");
        }

        let r = u8::from_str_radix(&hex[0..2], 16)
            .context(format!("Invalid red channel in hex color '{hex}'"))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .context(format!("Invalid green channel in hex color '{hex}'"))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .context(format!("Invalid blue channel in hex color '{hex}'"))?;

        Ok(Self::new(r, g, b))
    }

    /// Converts the color to a hex string in the format "#rrggbb" (lowercase),
    /// matching what the status page and the display show.
    ///
    /// ```
    /// use lrv_meter::models::RgbColor;
    ///
    /// assert_eq!(RgbColor::new(0, 128, 255).to_hex(), "#0080ff");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scales raw counts against the clear channel: `min(255, x / c * 255)`.
    ///
    /// A zero clear channel yields black.
    #[must_use]
    pub fn scaled_from_raw(raw: &RawChannels) -> Self {
        if raw.is_dark() {
            return Self::new(0, 0, 0);
        }
        let c = f64::from(raw.c);
        let scale = |x: u16| (f64::from(x) / c * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(scale(raw.r), scale(raw.g), scale(raw.b))
    }

    /// Scales raw counts against the brightest color channel, so the dominant
    /// channel always reads 255.
    ///
    /// All-zero color channels yield black.
    #[must_use]
    pub fn clamped_from_raw(raw: &RawChannels) -> Self {
        let peak = raw.r.max(raw.g).max(raw.b);
        if peak == 0 {
            return Self::new(0, 0, 0);
        }
        let peak = f64::from(peak);
        let scale = |x: u16| (f64::from(x) / peak * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(scale(raw.r), scale(raw.g), scale(raw.b))
    }

    /// Squared Euclidean distance to another color in RGB space.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db).unsigned_abs()
    }

    /// Euclidean distance to another color in RGB space.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        f64::from(self.distance_squared(other)).sqrt()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
