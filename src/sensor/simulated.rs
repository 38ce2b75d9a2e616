//! Synthetic sensor used when no hardware is attached.

// Channel counts are computed in f64 and stored as u16
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Sensor, SensorError};
use crate::models::{RawChannels, RgbColor};

/// Clear-channel count with the LEDs on.
const LIT_CLEAR_COUNT: f64 = 1200.0;
/// Clear-channel count from ambient light only.
const AMBIENT_CLEAR_COUNT: f64 = 40.0;
/// Default relative noise applied to every channel.
const DEFAULT_JITTER: f64 = 0.01;

/// Simulates the sensor pointed at a flat surface of one color.
///
/// Color channels are the surface's fraction of the clear count, so scaling a
/// reading against its clear channel recovers the surface color.
#[derive(Debug)]
pub struct SimulatedSensor {
    surface: RgbColor,
    jitter: f64,
    illuminated: bool,
    rng: StdRng,
}

impl SimulatedSensor {
    /// Creates a simulated sensor looking at `surface`.
    #[must_use]
    pub fn new(surface: RgbColor) -> Self {
        Self {
            surface,
            jitter: DEFAULT_JITTER,
            illuminated: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uses a deterministic noise source.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sets the relative noise amplitude (0.01 = ±1%).
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    /// Points the sensor at another surface.
    pub fn set_surface(&mut self, surface: RgbColor) {
        self.surface = surface;
    }

    /// Whether the simulated LEDs are on.
    #[must_use]
    pub const fn is_illuminated(&self) -> bool {
        self.illuminated
    }

    fn noise(&mut self) -> f64 {
        if self.jitter > 0.0 {
            1.0 + self.rng.random_range(-self.jitter..=self.jitter)
        } else {
            1.0
        }
    }

    fn count(&mut self, base: f64) -> u16 {
        (base * self.noise()).round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

impl Sensor for SimulatedSensor {
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        let clear = if self.illuminated {
            LIT_CLEAR_COUNT
        } else {
            AMBIENT_CLEAR_COUNT
        };
        let fraction = |x: u8| f64::from(x) / 255.0 * clear;
        let (r, g, b) = (
            fraction(self.surface.r),
            fraction(self.surface.g),
            fraction(self.surface.b),
        );

        Ok(RawChannels::new(
            self.count(r),
            self.count(g),
            self.count(b),
            self.count(clear),
        ))
    }

    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError> {
        self.illuminated = on;
        Ok(())
    }
}
