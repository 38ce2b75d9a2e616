//! Sensor port and adapters.
//!
//! The measurement pipeline reads RGBC samples through the [`Sensor`] trait
//! and never talks to hardware directly. Adapters:
//!
//! - [`SimulatedSensor`]: synthetic readings of a surface color under the
//!   on-board LEDs
//! - [`ReplaySensor`]: previously recorded samples, in order
//!
//! [`IlluminatedSensor`] wraps any sensor and guarantees the LEDs are switched
//! off again when it goes out of scope.

pub mod guard;
pub mod replay;
pub mod simulated;

pub use guard::IlluminatedSensor;
pub use replay::{IlluminationProbe, ReplaySensor};
pub use simulated::SimulatedSensor;

use thiserror::Error;

use crate::models::{RawChannels, ScaledColor};

/// Error type for sensor operations
#[derive(Debug, Error)]
pub enum SensorError {
    /// Failed to read channel data
    #[error("Failed to read sensor channels: {0}")]
    ReadFailed(String),
    /// Failed to switch the illumination LEDs
    #[error("Failed to switch sensor illumination: {0}")]
    IlluminationFailed(String),
    /// A recorded sample source has no more samples
    #[error("Sensor sample source exhausted after {0} readings")]
    Exhausted(usize),
}

/// Port for reading RGBC color sensors.
pub trait Sensor {
    /// Reads one raw 4-channel sample.
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError>;

    /// Reads one sample scaled to 8 bits per channel against the clear channel.
    ///
    /// The default implementation takes a fresh raw reading and scales it the
    /// way the BH1745 driver does.
    fn read_scaled(&mut self) -> Result<ScaledColor, SensorError> {
        self.read_raw_channels()
            .map(|raw| ScaledColor::scaled_from_raw(&raw))
    }

    /// Switches the sensor's illumination LEDs.
    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError>;
}

impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        (**self).read_raw_channels()
    }

    fn read_scaled(&mut self) -> Result<ScaledColor, SensorError> {
        (**self).read_scaled()
    }

    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError> {
        (**self).set_illumination(on)
    }
}

impl<S: Sensor + ?Sized> Sensor for &mut S {
    fn read_raw_channels(&mut self) -> Result<RawChannels, SensorError> {
        (**self).read_raw_channels()
    }

    fn read_scaled(&mut self) -> Result<ScaledColor, SensorError> {
        (**self).read_scaled()
    }

    fn set_illumination(&mut self, on: bool) -> Result<(), SensorError> {
        (**self).set_illumination(on)
    }
}
