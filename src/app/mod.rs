//! Application orchestration layer
//!
//! Wires configuration, sensor, calibration and sinks together for the
//! binary, without containing measurement logic itself.

/// Interactive calibration and scaling-factor resolution
pub mod calibration;

pub mod sampling;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{Config, SensorBackend};
use crate::models::RgbColor;
use crate::sensor::{ReplaySensor, Sensor, SimulatedSensor};
use crate::services::MeasurementPipeline;
use crate::sinks::{ConsoleSink, DisplaySink, SnapshotSink, SnapshotSlot, TextPanel};

// Re-export commonly used functions for convenience
pub use calibration::{
    resolve_scaling_factor, resolve_scaling_factor_until_cancelled, CalibrationMode,
    ConsolePrompt, SamplePrompt,
};
pub use sampling::{run_sampling_loop, warm_up, LoopSettings, LoopSummary, StopReason};

/// Boxed sensor chosen at runtime.
pub type DynSensor = Box<dyn Sensor + Send>;

/// Builds the configured sensor adapter.
pub fn build_sensor(config: &Config) -> Result<DynSensor> {
    let sensor = &config.sensor;
    match sensor.backend {
        SensorBackend::Simulated => {
            let surface = RgbColor::from_hex(&sensor.simulated_surface)
                .context("Invalid simulated_surface color")?;
            Ok(Box::new(SimulatedSensor::new(surface)))
        }
        SensorBackend::Replay => {
            let path = sensor
                .replay_file
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Replay sensor selected but replay_file not set"))?;
            Ok(Box::new(ReplaySensor::from_file(path, sensor.replay_repeat)?))
        }
    }
}

/// Builds the measurement pipeline for a resolved scaling factor.
pub fn build_pipeline(config: &Config, scaling_factor: f64) -> Result<MeasurementPipeline> {
    let palette = config.palette.load()?;
    Ok(MeasurementPipeline::new(
        config.sensor.normalizer(),
        Arc::new(palette),
        scaling_factor,
    ))
}

/// Console report, optional display, and the status slot when serving.
pub fn build_sinks(config: &Config, status: Option<SnapshotSlot>) -> Vec<Box<dyn SnapshotSink>> {
    let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![Box::new(ConsoleSink::stdout())];
    if config.display.enabled {
        sinks.push(Box::new(DisplaySink::new(TextPanel::new(
            std::io::stderr(),
            config.display.bar_width,
        ))));
    }
    if let Some(slot) = status {
        sinks.push(Box::new(slot));
    }
    sinks
}
