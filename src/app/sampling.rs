//! The measurement loop: read, compute, fan out, sleep, until interrupted.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SensorConfig;
use crate::sensor::{IlluminatedSensor, Sensor};
use crate::services::naming::{apply_lookup, NameLookup};
use crate::services::MeasurementPipeline;
use crate::sinks::SnapshotSink;

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Pause between cycles
    pub interval: Duration,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
}

impl LoopSettings {
    /// Settings from the `[sensor]` section.
    #[must_use]
    pub const fn from_config(config: &SensorConfig, max_cycles: Option<u64>) -> Self {
        Self {
            interval: config.sample_interval(),
            max_cycles,
        }
    }
}

/// Why the loop ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Interrupt received
    Cancelled,
    /// Configured cycle count reached
    CycleLimit,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Completed cycles
    pub cycles: u64,
    /// How the loop ended
    pub reason: StopReason,
}

/// Runs the sampling loop until `cancel` fires or the cycle limit is hit.
///
/// Takes the illuminated sensor by value, so the LEDs are switched off on
/// every way out: normal stop, cancellation, or a sensor error propagated
/// from here. Sink failures are logged and the loop carries on.
pub async fn run_sampling_loop<S: Sensor>(
    mut sensor: IlluminatedSensor<S>,
    pipeline: &MeasurementPipeline,
    naming: Option<&dyn NameLookup>,
    sinks: &mut [Box<dyn SnapshotSink>],
    settings: LoopSettings,
    cancel: CancellationToken,
) -> Result<LoopSummary> {
    info!(
        "Sampling every {} ms (scaling factor {:.4})",
        settings.interval.as_millis(),
        pipeline.scaling_factor()
    );

    let mut cycles = 0u64;
    let reason = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }

        let snapshot = pipeline
            .measure(&mut *sensor)
            .context("Failed to read color sensor")?;

        let snapshot = match naming {
            Some(lookup) => tokio::select! {
                () = cancel.cancelled() => break StopReason::Cancelled,
                named = apply_lookup(snapshot, lookup) => named,
            },
            None => snapshot,
        };

        let snapshot = Arc::new(snapshot);
        debug!(
            "Cycle {}: {} {} LRV {:.1}",
            cycles + 1,
            snapshot.color_hex(),
            snapshot.display_name(),
            snapshot.lrv()
        );
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.accepts(&snapshot) {
                warn!("{} sink failed: {:#}", sink.name(), e);
            }
        }

        cycles += 1;
        if settings.max_cycles.is_some_and(|max| cycles >= max) {
            break StopReason::CycleLimit;
        }

        tokio::select! {
            () = cancel.cancelled() => break StopReason::Cancelled,
            () = tokio::time::sleep(settings.interval) => {}
        }
    };

    sensor
        .shutdown()
        .context("Failed to switch sensor illumination off")?;
    info!("Sampling stopped after {} cycle(s): {:?}", cycles, reason);

    Ok(LoopSummary { cycles, reason })
}

/// Lets the LEDs settle before the first reading.
///
/// Returns the sensor once `warmup` has passed, or `None` if `cancel` fired
/// first, with the LEDs already switched off.
pub async fn warm_up<S: Sensor>(
    mut sensor: IlluminatedSensor<S>,
    warmup: Duration,
    cancel: &CancellationToken,
) -> Result<Option<IlluminatedSensor<S>>> {
    tokio::select! {
        () = cancel.cancelled() => {
            sensor
                .shutdown()
                .context("Failed to switch sensor illumination off")?;
            info!("Interrupted during warm-up");
            Ok(None)
        }
        () = tokio::time::sleep(warmup) => Ok(Some(sensor)),
    }
}
