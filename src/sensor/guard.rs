//! Scoped sensor illumination.

use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

use super::{Sensor, SensorError};

/// Owns a sensor with its LEDs switched on and switches them off on drop.
///
/// Every exit path out of the measurement loop (normal completion,
/// cancellation, a propagated error or a panic unwinding through it) drops
/// the guard, so the LEDs never stay lit.
#[derive(Debug)]
pub struct IlluminatedSensor<S: Sensor> {
    sensor: S,
    lit: bool,
}

impl<S: Sensor> IlluminatedSensor<S> {
    /// Switches the LEDs on and takes ownership of the sensor.
    pub fn new(mut sensor: S) -> Result<Self, SensorError> {
        if let Err(e) = sensor.set_illumination(true) {
            // Partially applied switch-on must not leave LEDs lit
            let _ = sensor.set_illumination(false);
            return Err(e);
        }
        debug!("Sensor illumination on");
        Ok(Self { sensor, lit: true })
    }

    /// Whether the LEDs are still on.
    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.lit
    }

    /// Switches the LEDs off now, reporting failure to the caller.
    ///
    /// Reads after shutdown are still allowed; drop will not switch again.
    pub fn shutdown(&mut self) -> Result<(), SensorError> {
        if !self.lit {
            return Ok(());
        }
        self.lit = false;
        self.sensor.set_illumination(false)?;
        debug!("Sensor illumination off");
        Ok(())
    }
}

impl<S: Sensor> Deref for IlluminatedSensor<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sensor
    }
}

impl<S: Sensor> DerefMut for IlluminatedSensor<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

impl<S: Sensor> Drop for IlluminatedSensor<S> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to switch sensor illumination off: {}", e);
        }
    }
}
