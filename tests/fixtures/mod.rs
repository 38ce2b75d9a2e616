//! Shared fixtures for integration tests.
#![allow(dead_code)] // Not every test file uses every fixture

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lrv_meter::app::LoopSettings;
use lrv_meter::models::{
    CalibrationSample, ColorPalette, MeasurementSnapshot, RawChannels, ScaledColor,
};
use lrv_meter::services::naming::NameLookup;
use lrv_meter::services::{CalibrationEngine, ChannelNormalizer, MeasurementPipeline};
use lrv_meter::sinks::SnapshotSink;

/// The sample used throughout: dim olive green, LRV 37.6 at factor 100.
pub const OLIVE: RawChannels = RawChannels::new(50, 60, 40, 150);

/// Pipeline over the built-in palette.
pub fn test_pipeline(scaling_factor: f64) -> MeasurementPipeline {
    MeasurementPipeline::new(
        ChannelNormalizer::uncorrected(),
        Arc::new(ColorPalette::load().unwrap()),
        scaling_factor,
    )
}

/// Engine with the stock White/Gray/Black references, five readings each.
pub fn test_engine() -> CalibrationEngine {
    CalibrationEngine::new(CalibrationSample::default_references(), 5, 100.0)
}

/// Five identical grey readings per reference, at the given counts out of 1000.
///
/// Levels 800/400/50 give per-sample factors 120/125/80.
pub fn reference_readings(levels: &[u16]) -> Vec<RawChannels> {
    let mut samples = Vec::new();
    for &level in levels {
        samples.extend([RawChannels::new(level, level, level, 1000); 5]);
    }
    samples
}

/// Fast loop settings.
pub const fn fast_loop(max_cycles: Option<u64>) -> LoopSettings {
    LoopSettings {
        interval: Duration::from_millis(2),
        max_cycles,
    }
}

/// Fixed snapshot with deterministic timestamp.
pub fn olive_snapshot() -> MeasurementSnapshot {
    let timestamp = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    test_pipeline(100.0).assemble(OLIVE, ScaledColor::scaled_from_raw(&OLIVE), timestamp)
}

/// Sink that keeps every snapshot it sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    seen: Arc<Mutex<Vec<Arc<MeasurementSnapshot>>>>,
}

impl RecordingSink {
    /// Snapshots received so far.
    pub fn seen(&self) -> Vec<Arc<MeasurementSnapshot>> {
        self.seen.lock().unwrap().clone()
    }
}

impl SnapshotSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn accepts(&mut self, snapshot: &Arc<MeasurementSnapshot>) -> Result<()> {
        self.seen.lock().unwrap().push(Arc::clone(snapshot));
        Ok(())
    }
}

/// Sink that always fails.
#[derive(Debug, Default)]
pub struct FailingSink;

impl SnapshotSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn accepts(&mut self, _snapshot: &Arc<MeasurementSnapshot>) -> Result<()> {
        bail!("display unplugged")
    }
}

/// Naming service with a canned answer.
#[derive(Debug, Clone)]
pub struct FixedLookup(pub Option<&'static str>);

#[async_trait]
impl NameLookup for FixedLookup {
    async fn lookup_name(&self, _hex: &str) -> Option<String> {
        self.0.map(String::from)
    }
}
