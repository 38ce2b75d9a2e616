//! Guided calibration against known-reflectance reference cards.
//!
//! The engine is a state machine driven by a front end:
//!
//! ```text
//! Uncalibrated -> AwaitingSample(0) -> ... -> AwaitingSample(n-1) -> Computing -> Calibrated
//! ```
//!
//! While in `AwaitingSample(i)` the engine is waiting for the operator to place
//! reference `i` under the sensor. The front end then either supplies the
//! readings ([`CalibrationEngine::record_sample`] or
//! [`CalibrationEngine::measure`]) or skips the reference. Persisting the
//! result is the caller's job (see `CalibrationStore`).

use anyhow::Result;
use tracing::{info, warn};

use crate::config::CalibrationConfig;
use crate::models::{CalibrationSample, CalibrationState, RawChannels};
use crate::sensor::Sensor;

use super::lrv::raw_luminance;

/// Where the calibration procedure currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// No usable scaling factor
    Uncalibrated,
    /// Waiting for reference `i` to be placed under the sensor
    AwaitingSample(usize),
    /// All references handled, factor not derived yet
    Computing,
    /// Procedure finished
    Calibrated(CalibrationState),
}

/// What one reference contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Reference that was measured
    pub reference: CalibrationSample,
    /// Readings with a non-zero clear channel
    pub valid_readings: usize,
    /// Mean unscaled luminance of the valid readings
    pub average_luminance: Option<f64>,
    /// Derived per-sample factor, `None` when the reference was unusable
    pub factor: Option<f64>,
}

impl SampleOutcome {
    fn skipped(reference: CalibrationSample) -> Self {
        Self {
            reference,
            valid_readings: 0,
            average_luminance: None,
            factor: None,
        }
    }
}

/// Mean unscaled luminance of the readings with `c != 0`.
///
/// Returns `None` when every reading is dark.
#[must_use]
pub fn average_luminance(readings: &[RawChannels]) -> Option<f64> {
    let valid: Vec<f64> = readings
        .iter()
        .filter(|raw| !raw.is_dark())
        .map(raw_luminance)
        .collect();
    if valid.is_empty() {
        return None;
    }
    Some(valid.iter().sum::<f64>() / valid.len() as f64)
}

/// Per-sample factor `known_reflectance_pct / average_luminance`.
///
/// `None` when no reading is valid, the average luminance is not positive, or
/// the factor would not be a usable (finite, positive) scaling factor.
#[must_use]
pub fn sample_factor(known_reflectance_pct: f64, readings: &[RawChannels]) -> Option<f64> {
    average_luminance(readings)
        .filter(|luminance| *luminance > 0.0)
        .map(|luminance| known_reflectance_pct / luminance)
        .filter(|factor| CalibrationState::new(*factor).is_valid())
}

/// Arithmetic mean of the per-sample factors, or `default` when there are none.
#[must_use]
pub fn combine(factors: &[f64], default: f64) -> f64 {
    if factors.is_empty() {
        return default;
    }
    factors.iter().sum::<f64>() / factors.len() as f64
}

/// Drives one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    references: Vec<CalibrationSample>,
    readings_per_sample: usize,
    default_factor: f64,
    phase: CalibrationPhase,
    outcomes: Vec<SampleOutcome>,
}

impl CalibrationEngine {
    /// Creates an engine for the given ordered references.
    #[must_use]
    pub fn new(
        references: Vec<CalibrationSample>,
        readings_per_sample: usize,
        default_factor: f64,
    ) -> Self {
        Self {
            references,
            readings_per_sample,
            default_factor,
            phase: CalibrationPhase::Uncalibrated,
            outcomes: Vec::new(),
        }
    }

    /// Creates an engine from the `[calibration]` config section.
    #[must_use]
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(
            config.references.clone(),
            config.readings_per_sample,
            config.default_scaling_factor,
        )
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Reference cards in measurement order.
    #[must_use]
    pub fn references(&self) -> &[CalibrationSample] {
        &self.references
    }

    /// Raw readings taken per reference.
    #[must_use]
    pub const fn readings_per_sample(&self) -> usize {
        self.readings_per_sample
    }

    /// Factor used when no reference yields a usable sample.
    #[must_use]
    pub const fn default_factor(&self) -> f64 {
        self.default_factor
    }

    /// Per-reference results recorded so far.
    #[must_use]
    pub fn outcomes(&self) -> &[SampleOutcome] {
        &self.outcomes
    }

    /// Starts (or restarts) the procedure.
    ///
    /// Returns the first reference to place, or `None` when there are no
    /// references and the engine went straight to `Computing`.
    pub fn begin(&mut self) -> Option<&CalibrationSample> {
        self.outcomes.clear();
        self.phase = if self.references.is_empty() {
            CalibrationPhase::Computing
        } else {
            CalibrationPhase::AwaitingSample(0)
        };
        info!(
            "Calibration started with {} reference(s)",
            self.references.len()
        );
        self.pending_request()
    }

    /// The reference the engine is waiting for, if any.
    #[must_use]
    pub fn pending_request(&self) -> Option<&CalibrationSample> {
        match self.phase {
            CalibrationPhase::AwaitingSample(index) => self.references.get(index),
            _ => None,
        }
    }

    /// Records the readings taken for the pending reference and advances.
    ///
    /// Dark readings are discarded. A reference with no usable readings
    /// contributes nothing.
    pub fn record_sample(&mut self, readings: &[RawChannels]) -> Result<&SampleOutcome> {
        let reference = self.take_pending()?;
        let average = average_luminance(readings);
        let factor = sample_factor(reference.known_reflectance_pct, readings);
        let valid_readings = readings.iter().filter(|raw| !raw.is_dark()).count();

        match factor {
            Some(factor) => info!(
                "{}: {} valid reading(s), luminance {:.4}, factor {:.4}",
                reference.label,
                valid_readings,
                average.unwrap_or_default(),
                factor
            ),
            None => warn!(
                "{}: no usable readings ({} of {} valid), skipping",
                reference.label,
                valid_readings,
                readings.len()
            ),
        }

        Ok(self.push_outcome(SampleOutcome {
            reference,
            valid_readings,
            average_luminance: average,
            factor,
        }))
    }

    /// Takes the configured number of readings from `sensor` for the pending
    /// reference and records them.
    ///
    /// Sensor failures propagate and leave the engine waiting on the same
    /// reference.
    pub fn measure<S: Sensor + ?Sized>(&mut self, sensor: &mut S) -> Result<&SampleOutcome> {
        if self.pending_request().is_none() {
            anyhow::bail!("Calibration is not waiting for a sample");
        }
        let readings = (0..self.readings_per_sample)
            .map(|_| sensor.read_raw_channels())
            .collect::<Result<Vec<_>, _>>()?;
        self.record_sample(&readings)
    }

    /// Skips the pending reference without measuring it.
    pub fn skip_sample(&mut self) -> Result<&SampleOutcome> {
        let reference = self.take_pending()?;
        info!("{}: skipped by operator", reference.label);
        Ok(self.push_outcome(SampleOutcome::skipped(reference)))
    }

    /// Derives the final scaling factor once every reference is handled.
    ///
    /// Falls back to the default factor when no reference was usable.
    pub fn finish(&mut self) -> Result<CalibrationState> {
        if self.phase != CalibrationPhase::Computing {
            anyhow::bail!(
                "Calibration cannot finish in phase {:?}; references remain",
                self.phase
            );
        }

        let factors: Vec<f64> = self.outcomes.iter().filter_map(|o| o.factor).collect();
        if factors.is_empty() {
            warn!(
                "No valid calibration samples; using default scaling factor {}",
                self.default_factor
            );
        }
        let mut state = CalibrationState::new(combine(&factors, self.default_factor));
        if !state.is_valid() {
            warn!(
                "Derived scaling factor {} is unusable; using default {}",
                state.scaling_factor, self.default_factor
            );
            state = CalibrationState::new(self.default_factor);
        }
        info!(
            "Calibration complete: scaling factor {:.4} from {} sample(s)",
            state.scaling_factor,
            factors.len()
        );

        self.phase = CalibrationPhase::Calibrated(state);
        Ok(state)
    }

    /// Abandons the run and returns to `Uncalibrated`.
    pub fn abort(&mut self) {
        warn!("Calibration aborted");
        self.outcomes.clear();
        self.phase = CalibrationPhase::Uncalibrated;
    }

    fn take_pending(&mut self) -> Result<CalibrationSample> {
        match self.pending_request() {
            Some(reference) => Ok(reference.clone()),
            None => anyhow::bail!(
                "Calibration is not waiting for a sample (phase {:?})",
                self.phase
            ),
        }
    }

    fn push_outcome(&mut self, outcome: SampleOutcome) -> &SampleOutcome {
        self.outcomes.push(outcome);
        let next = self.outcomes.len();
        self.phase = if next < self.references.len() {
            CalibrationPhase::AwaitingSample(next)
        } else {
            CalibrationPhase::Computing
        };
        &self.outcomes[next - 1]
    }
}
