//! Turns one raw sample into a complete [`MeasurementSnapshot`].

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::models::{ColorPalette, MeasurementSnapshot, RawChannels, ScaledColor};
use crate::sensor::{Sensor, SensorError};

use super::classifier::classify;
use super::lrv;
use super::normalizer::ChannelNormalizer;

/// Process-wide measurement context: normalization policy, palette and the
/// calibrated scaling factor.
#[derive(Debug, Clone)]
pub struct MeasurementPipeline {
    normalizer: ChannelNormalizer,
    palette: Arc<ColorPalette>,
    scaling_factor: f64,
}

impl MeasurementPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(
        normalizer: ChannelNormalizer,
        palette: Arc<ColorPalette>,
        scaling_factor: f64,
    ) -> Self {
        Self {
            normalizer,
            palette,
            scaling_factor,
        }
    }

    /// Scaling factor applied to every LRV.
    #[must_use]
    pub const fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    /// Palette used for classification.
    #[must_use]
    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Derives every field of a snapshot from one sample.
    ///
    /// Never fails. A dark sample gets LRV 0 while the color is still
    /// classified from `scaled`.
    #[must_use]
    pub fn assemble(
        &self,
        raw: RawChannels,
        scaled: ScaledColor,
        timestamp: DateTime<Utc>,
    ) -> MeasurementSnapshot {
        let normalized = self.normalizer.normalize(&raw);
        let color_name = classify(&scaled, &self.palette).to_string();
        let lrv = lrv::compute(&raw, self.scaling_factor);

        MeasurementSnapshot::new(timestamp, raw, normalized, scaled, Some(color_name), lrv)
    }

    /// Reads one sample from `sensor` and assembles it, stamped now.
    ///
    /// The scaled color is derived from the same raw sample so both views
    /// describe one instant.
    pub fn measure<S: Sensor + ?Sized>(
        &self,
        sensor: &mut S,
    ) -> Result<MeasurementSnapshot, SensorError> {
        let raw = sensor.read_raw_channels()?;
        let scaled = ScaledColor::scaled_from_raw(&raw);
        Ok(self.assemble(raw, scaled, Utc::now()))
    }
}
